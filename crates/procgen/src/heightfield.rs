//! Normalized 2D elevation grid.

/// `width x length` samples in `[0, 1]`, stored row by row (`y` outer, `x` inner).
#[derive(Debug, Clone, PartialEq)]
pub struct Heightfield {
    width: u32,
    length: u32,
    samples: Vec<f32>,
}

impl Heightfield {
    /// Wrap raw samples. `samples.len()` must equal `width * length`.
    pub(crate) fn from_samples(width: u32, length: u32, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len(), width as usize * length as usize);
        Self {
            width,
            length,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.length)
    }

    /// Sample at grid cell `(x, y)`. Panics if out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.length, "({x}, {y}) outside heightfield");
        self.samples[self.index(x, y)]
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// All samples in storage order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// `(min, max)` over all samples.
    pub fn range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_indexing() {
        let hf = Heightfield::from_samples(3, 2, vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(hf.get(2, 0), 0.2);
        assert_eq!(hf.get(0, 1), 0.3);
        assert_eq!(hf.index(1, 1), 4);
        assert_eq!(hf.range(), (0.0, 0.5));
    }
}
