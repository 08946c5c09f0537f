use glam::{Mat4, Vec3};

use crate::error::RenderError;
use crate::range::BufferRange;

/// Rounds `value` up to the next multiple of `alignment` (a power of two).
pub fn align_up(value: u64, alignment: u64) -> Result<u64, RenderError> {
    if !alignment.is_power_of_two() {
        return Err(RenderError::InvalidAlignment(alignment));
    }
    Ok((value + alignment - 1) & !(alignment - 1))
}

/// CPU staging copy of the frame uniform buffer.
///
/// The byte image is rebuilt every frame through [`map`](Self::map) and
/// uploaded in one `write_buffer` call. Capacity is fixed at creation.
#[derive(Debug)]
pub struct UniformBuffer {
    data: Vec<u8>,
    head: u64,
    written: u64,
}

impl UniformBuffer {
    pub fn new(capacity: u64) -> Self {
        Self {
            data: vec![0; capacity as usize],
            head: 0,
            written: 0,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    /// Bytes produced by the last completed write pass.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Bytes to upload, padded to a multiple of four as `write_buffer` requires.
    pub fn upload_bytes(&self) -> &[u8] {
        let end = (self.written + 3) & !3;
        &self.data[..end.min(self.capacity()) as usize]
    }

    /// Opens the buffer for writing. The head starts at zero.
    pub fn map(&mut self) -> UniformWriter<'_> {
        self.head = 0;
        UniformWriter { buf: self }
    }
}

/// Exclusive write access to a [`UniformBuffer`].
///
/// Dropping the writer (or calling [`unmap`](Self::unmap)) publishes the
/// written size.
#[derive(Debug)]
pub struct UniformWriter<'a> {
    buf: &'a mut UniformBuffer,
}

impl UniformWriter<'_> {
    /// Current write offset in bytes.
    pub fn head(&self) -> u64 {
        self.buf.head
    }

    /// Advances the head to the next multiple of `alignment`, zero-filling the gap.
    pub fn align(&mut self, alignment: u64) -> Result<u64, RenderError> {
        let target = align_up(self.buf.head, alignment)?;
        self.check(target)?;
        self.buf.data[self.buf.head as usize..target as usize].fill(0);
        self.buf.head = target;
        Ok(target)
    }

    /// Writes `bytes` at `alignment` and returns where they landed.
    pub fn push_bytes(&mut self, bytes: &[u8], alignment: u64) -> Result<BufferRange, RenderError> {
        let offset = self.align(alignment)?;
        let end = offset + bytes.len() as u64;
        self.check(end)?;
        self.buf.data[offset as usize..end as usize].copy_from_slice(bytes);
        self.buf.head = end;
        Ok(BufferRange::new(offset, bytes.len() as u64))
    }

    pub fn push_u32(&mut self, value: u32) -> Result<BufferRange, RenderError> {
        self.push_bytes(&value.to_ne_bytes(), 4)
    }

    /// 12 bytes at a 16-byte boundary.
    pub fn push_vec3(&mut self, value: Vec3) -> Result<BufferRange, RenderError> {
        self.push_bytes(bytemuck::bytes_of(&value.to_array()), 16)
    }

    /// Column-major, 64 bytes at a 16-byte boundary.
    pub fn push_mat4(&mut self, value: &Mat4) -> Result<BufferRange, RenderError> {
        self.push_bytes(bytemuck::bytes_of(&value.to_cols_array()), 16)
    }

    /// Reserves `size` zeroed bytes at `alignment`.
    pub fn reserve(&mut self, size: u64, alignment: u64) -> Result<BufferRange, RenderError> {
        let offset = self.align(alignment)?;
        let end = offset + size;
        self.check(end)?;
        self.buf.data[offset as usize..end as usize].fill(0);
        self.buf.head = end;
        Ok(BufferRange::new(offset, size))
    }

    pub fn unmap(self) {}

    fn check(&self, end: u64) -> Result<(), RenderError> {
        if end > self.buf.capacity() {
            return Err(RenderError::UniformOverflow {
                requested: end,
                capacity: self.buf.capacity(),
            });
        }
        Ok(())
    }
}

impl Drop for UniformWriter<'_> {
    fn drop(&mut self) {
        self.buf.written = self.buf.head;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_power_of_two() {
        assert_eq!(align_up(0, 256).unwrap(), 0);
        assert_eq!(align_up(1, 256).unwrap(), 256);
        assert_eq!(align_up(256, 256).unwrap(), 256);
        assert_eq!(align_up(13, 4).unwrap(), 16);
    }

    #[test]
    fn align_up_rejects_non_power_of_two() {
        assert!(matches!(align_up(10, 24), Err(RenderError::InvalidAlignment(24))));
        assert!(matches!(align_up(10, 0), Err(RenderError::InvalidAlignment(0))));
    }

    #[test]
    fn vec3_then_u32_packs_tightly() {
        let mut buf = UniformBuffer::new(64);
        let mut w = buf.map();
        assert_eq!(w.push_vec3(Vec3::ONE).unwrap(), BufferRange::new(0, 12));
        assert_eq!(w.push_u32(7).unwrap(), BufferRange::new(12, 4));
        assert_eq!(w.push_vec3(Vec3::ONE).unwrap(), BufferRange::new(16, 12));
        w.unmap();
        assert_eq!(buf.written(), 28);
        assert_eq!(buf.upload_bytes().len(), 28);
    }

    #[test]
    fn alignment_gap_is_zeroed() {
        let mut buf = UniformBuffer::new(64);
        {
            let mut w = buf.map();
            w.push_bytes(&[0xff; 32], 4).unwrap();
        }
        let mut w = buf.map();
        w.push_u32(1).unwrap();
        w.align(16).unwrap();
        drop(w);
        assert_eq!(&buf.upload_bytes()[4..16], &[0u8; 12]);
    }

    #[test]
    fn map_resets_head() {
        let mut buf = UniformBuffer::new(64);
        buf.map().push_u32(1).unwrap();
        let w = buf.map();
        assert_eq!(w.head(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        let mut buf = UniformBuffer::new(64);
        let mut w = buf.map();
        w.push_mat4(&Mat4::IDENTITY).unwrap();
        let err = w.push_u32(1).unwrap_err();
        assert!(matches!(err, RenderError::UniformOverflow { requested: 68, capacity: 64 }));
    }

    #[test]
    fn upload_is_padded_to_four() {
        let mut buf = UniformBuffer::new(16);
        buf.map().push_bytes(&[1, 2, 3, 4, 5], 1).unwrap();
        assert_eq!(buf.upload_bytes().len(), 8);
    }
}
