/// A byte slice of a GPU buffer, expressed as plain offsets.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct BufferRange {
    pub offset: u64,
    pub size: u64,
}

impl BufferRange {
    #[inline]
    pub const fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// One past the last byte.
    #[inline]
    pub const fn end(&self) -> u64 {
        self.offset + self.size
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Half-open overlap test; empty ranges never overlap.
    pub fn overlaps(&self, other: &BufferRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.offset < other.end() && other.offset < self.end()
    }

    /// `offset..end` for `wgpu::Buffer::slice`.
    #[inline]
    pub fn bounds(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let a = BufferRange::new(0, 128);
        let b = BufferRange::new(128, 128);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn nested_ranges_overlap() {
        let a = BufferRange::new(0, 256);
        let b = BufferRange::new(64, 16);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn empty_range_never_overlaps() {
        let a = BufferRange::new(0, 256);
        assert!(!a.overlaps(&BufferRange::new(10, 0)));
    }

    #[test]
    fn bounds_match_end() {
        let r = BufferRange::new(32, 96);
        assert_eq!(r.end(), 128);
        assert_eq!(r.bounds(), 32..128);
    }
}
