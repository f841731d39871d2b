use std::collections::BTreeMap;

use crate::foundation::error::{TexError, TexResult};
use crate::foundation::texel::Texel;

/// Identifier of an externally owned GPU-side texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

/// Rendering collaborator that owns texture resources.
///
/// The registry only asks for a resource to be created, refreshed from texels, or released; it
/// never manages GPU memory itself.
pub trait ResourceBackend {
    /// Create a `width x height` resource.
    fn create(&mut self, width: u32, height: u32) -> TexResult<ResourceId>;
    /// Replace the contents of `id`.
    fn upload(&mut self, id: ResourceId, texels: &[Texel], width: u32, height: u32)
    -> TexResult<()>;
    /// Drop `id`.
    fn release(&mut self, id: ResourceId) -> TexResult<()>;
}

/// Backend without a renderer: binding is refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResources;

impl ResourceBackend for NoResources {
    fn create(&mut self, _width: u32, _height: u32) -> TexResult<ResourceId> {
        Err(TexError::resource("no rendering backend attached"))
    }

    fn upload(
        &mut self,
        id: ResourceId,
        _texels: &[Texel],
        _width: u32,
        _height: u32,
    ) -> TexResult<()> {
        Err(TexError::resource(format!("unknown resource {}", id.0)))
    }

    fn release(&mut self, _id: ResourceId) -> TexResult<()> {
        Ok(())
    }
}

/// Last uploaded state of an in-memory resource.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResource {
    /// Width at creation.
    pub width: u32,
    /// Height at creation.
    pub height: u32,
    /// Texels of the latest upload.
    pub texels: Vec<Texel>,
    /// Number of uploads received.
    pub uploads: u64,
}

/// Headless backend keeping every resource in memory, for tests and offline use.
#[derive(Debug, Default)]
pub struct InMemoryResources {
    next: u32,
    /// Live resources by id.
    pub resources: BTreeMap<ResourceId, StoredResource>,
    /// Ids released so far, in order.
    pub released: Vec<ResourceId>,
}

impl InMemoryResources {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live resource `id`.
    pub fn get(&self, id: ResourceId) -> Option<&StoredResource> {
        self.resources.get(&id)
    }

    /// Drop `id` from the backend's side without telling the registry, as an engine does when
    /// it tears a resource down on its own.
    pub fn evict(&mut self, id: ResourceId) -> bool {
        self.resources.remove(&id).is_some()
    }
}

impl ResourceBackend for InMemoryResources {
    fn create(&mut self, width: u32, height: u32) -> TexResult<ResourceId> {
        self.next += 1;
        let id = ResourceId(self.next);
        self.resources.insert(
            id,
            StoredResource {
                width,
                height,
                texels: Vec::new(),
                uploads: 0,
            },
        );
        Ok(id)
    }

    fn upload(
        &mut self,
        id: ResourceId,
        texels: &[Texel],
        width: u32,
        height: u32,
    ) -> TexResult<()> {
        let res = self
            .resources
            .get_mut(&id)
            .ok_or_else(|| TexError::resource(format!("unknown resource {}", id.0)))?;
        if (res.width, res.height) != (width, height) {
            return Err(TexError::resource(format!(
                "resource {} is {}x{}, upload is {width}x{height}",
                id.0, res.width, res.height
            )));
        }
        res.texels.clear();
        res.texels.extend_from_slice(texels);
        res.uploads += 1;
        Ok(())
    }

    fn release(&mut self, id: ResourceId) -> TexResult<()> {
        self.resources.remove(&id);
        self.released.push(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/resource.rs"]
mod tests;
