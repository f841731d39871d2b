use std::path::PathBuf;

/// Convenience result type used across the texture engine.
pub type TexResult<T> = Result<T, TexError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TexError {
    /// A handle that does not refer to a live registry slot.
    #[error("invalid texture handle: {0}")]
    InvalidHandle(u32),

    /// Buffer dimensions that fall outside the 17 allocator buckets.
    #[error("texture size out of range: {width}x{height}")]
    SizeOutOfRange {
        /// Requested width in texels.
        width: u32,
        /// Requested height in texels.
        height: u32,
    },

    /// A bucket index outside `0..=16`.
    #[error("allocator magnitude out of range: {0}")]
    MagnitudeOutOfRange(u32),

    /// A single-channel selector that is not one of 1, 2, 4 or 8.
    #[error("invalid channel selector: {0}")]
    InvalidChannelSelector(u32),

    /// A channel write-mask with bits outside `0xf`.
    #[error("invalid channel mask: {0:#x}")]
    InvalidMask(u32),

    /// Every block of a bucket is currently handed out.
    #[error("allocator bucket {magnitude} exhausted (capacity {capacity})")]
    OutOfCapacity {
        /// Bucket index.
        magnitude: u32,
        /// Number of live blocks the bucket admits.
        capacity: usize,
    },

    /// A dispatcher partition failed or panicked.
    #[error("worker failure: {0}")]
    WorkerFailure(String),

    /// Invalid caller-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised by the external resource backend.
    #[error("resource error: {0}")]
    Resource(String),

    /// Filesystem failure while exporting or importing.
    #[error("io error on '{}': {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TexError {
    /// Build a [`TexError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TexError::WorkerFailure`] value.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::WorkerFailure(msg.into())
    }

    /// Build a [`TexError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`TexError::Io`] value for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
