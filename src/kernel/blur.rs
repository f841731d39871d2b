/// Odd-sized 1D blur kernel produced by repeated `[1, 1, 1]` diffusion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlurKernel1d {
    entries: Vec<u64>,
    weight: u64,
}

impl BlurKernel1d {
    /// Kernel after `level` diffusion steps; `size == 2 * level + 1`, `weight == 3^level`.
    pub fn new(level: u32) -> Self {
        let mut entries = vec![1u64];
        for _ in 0..level {
            let mut next = vec![0u64; entries.len() + 2];
            for (i, v) in entries.iter().enumerate() {
                next[i] += v;
                next[i + 1] += v;
                next[i + 2] += v;
            }
            entries = next;
        }
        let weight = entries.iter().sum();
        Self { entries, weight }
    }

    /// Number of taps.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Distance from the centre tap to either end.
    pub fn radius(&self) -> usize {
        self.entries.len() / 2
    }

    /// Sum of all taps.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Raw tap `i`.
    pub fn get(&self, i: usize) -> u64 {
        self.entries[i]
    }

    /// Tap `i` divided by the kernel weight.
    pub fn weighted(&self, i: usize) -> f64 {
        self.entries[i] as f64 / self.weight as f64
    }

    /// All raw taps.
    pub fn entries(&self) -> &[u64] {
        &self.entries
    }
}

/// 2D kernel built as the outer product of two 1D kernels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlurKernel2d {
    width: usize,
    height: usize,
    grid: Vec<u64>,
    weight: u64,
}

impl BlurKernel2d {
    /// `k ⊗ k`.
    pub fn square(k: &BlurKernel1d) -> Self {
        Self::outer(k, k)
    }

    /// `kx ⊗ ky`; `width = kx.size()`, `height = ky.size()`.
    pub fn outer(kx: &BlurKernel1d, ky: &BlurKernel1d) -> Self {
        let width = kx.size();
        let height = ky.size();
        let mut grid = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                grid.push(kx.get(x) * ky.get(y));
            }
        }
        let weight = grid.iter().sum();
        Self {
            width,
            height,
            grid,
            weight,
        }
    }

    /// Horizontal taps.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Vertical taps.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sum over the grid.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Cell `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> u64 {
        self.grid[x + y * self.width]
    }

    /// Cell `(x, y)` divided by the grid weight.
    pub fn weighted(&self, x: usize, y: usize) -> f64 {
        self.get(x, y) as f64 / self.weight as f64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/blur.rs"]
mod tests;
