//! Input/output views over caller-owned buffers.

use core::marker::PhantomData;
use core::ptr;
use core::slice;

use aes_core::{Block, BLOCK_SIZE};

use crate::error::EngineError;

/// A source and a destination of equal length, possibly the same memory.
///
/// Drivers read element `i` before they write element `i` and never look
/// back at earlier elements, so processing in place is well defined.
pub struct InOut<'a, T> {
    src: *const T,
    dst: *mut T,
    len: usize,
    _borrows: PhantomData<(&'a [T], &'a mut [T])>,
}

impl<'a, T: Copy> InOut<'a, T> {
    /// Reads from `input` and writes to a distinct `output` of the same length.
    pub fn split(input: &'a [T], output: &'a mut [T]) -> Result<Self, EngineError> {
        if input.len() != output.len() {
            return Err(EngineError::LengthMismatch {
                input: input.len(),
                output: output.len(),
            });
        }
        Ok(Self {
            src: input.as_ptr(),
            dst: output.as_mut_ptr(),
            len: input.len(),
            _borrows: PhantomData,
        })
    }

    /// Overwrites `data` with the result.
    pub fn in_place(data: &'a mut [T]) -> Self {
        let dst = data.as_mut_ptr();
        Self {
            src: dst.cast_const(),
            dst,
            len: data.len(),
            _borrows: PhantomData,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there is nothing to process.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn read(&self, index: usize) -> T {
        assert!(index < self.len);
        // SAFETY: in bounds of the borrowed input.
        unsafe { self.src.add(index).read() }
    }

    #[inline]
    pub(crate) fn write(&mut self, index: usize, value: T) {
        assert!(index < self.len);
        // SAFETY: in bounds of the exclusively borrowed output.
        unsafe { self.dst.add(index).write(value) }
    }
}

impl InOut<'_, u8> {
    /// Copies `buf.len()` input bytes starting at `offset` into `buf`.
    #[inline]
    pub(crate) fn read_into(&self, offset: usize, buf: &mut [u8]) {
        assert!(offset <= self.len && buf.len() <= self.len - offset);
        // SAFETY: range checked above; `buf` is a separate local buffer.
        unsafe { ptr::copy_nonoverlapping(self.src.add(offset), buf.as_mut_ptr(), buf.len()) }
    }

    /// Copies `buf` into the output starting at `offset`.
    #[inline]
    pub(crate) fn write_from(&mut self, offset: usize, buf: &[u8]) {
        assert!(offset <= self.len && buf.len() <= self.len - offset);
        // SAFETY: range checked above; `buf` is a separate local buffer.
        unsafe { ptr::copy_nonoverlapping(buf.as_ptr(), self.dst.add(offset), buf.len()) }
    }
}

impl<'a, T: Copy> From<&'a mut [T]> for InOut<'a, T> {
    fn from(data: &'a mut [T]) -> Self {
        Self::in_place(data)
    }
}

impl<'a, T: Copy, const N: usize> From<&'a mut [T; N]> for InOut<'a, T> {
    fn from(data: &'a mut [T; N]) -> Self {
        Self::in_place(data)
    }
}

/// Views a byte buffer as whole blocks.
pub fn as_blocks(bytes: &[u8]) -> Result<&[Block], EngineError> {
    if bytes.len() % BLOCK_SIZE != 0 {
        return Err(EngineError::NotBlockAligned { len: bytes.len() });
    }
    // SAFETY: `Block` is `[u8; 16]` (alignment 1, every bit pattern valid) and
    // the length is an exact multiple of its size.
    Ok(unsafe { slice::from_raw_parts(bytes.as_ptr().cast(), bytes.len() / BLOCK_SIZE) })
}

/// Views a mutable byte buffer as whole blocks.
pub fn as_blocks_mut(bytes: &mut [u8]) -> Result<&mut [Block], EngineError> {
    if bytes.len() % BLOCK_SIZE != 0 {
        return Err(EngineError::NotBlockAligned { len: bytes.len() });
    }
    // SAFETY: as in `as_blocks`, and the borrow stays exclusive.
    Ok(unsafe { slice::from_raw_parts_mut(bytes.as_mut_ptr().cast(), bytes.len() / BLOCK_SIZE) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rejects_length_mismatch() {
        let input = [0u8; 4];
        let mut output = [0u8; 5];
        assert_eq!(
            InOut::split(&input, &mut output).err(),
            Some(EngineError::LengthMismatch {
                input: 4,
                output: 5
            })
        );
    }

    #[test]
    fn in_place_reads_before_writing() {
        let mut data = [1u8, 2, 3];
        let mut buf = InOut::in_place(&mut data);
        for i in 0..buf.len() {
            let v = buf.read(i);
            buf.write(i, v * 10);
        }
        assert_eq!(data, [10, 20, 30]);
    }

    #[test]
    fn byte_ranges_round_trip() {
        let input: Vec<u8> = (0..20).collect();
        let mut output = vec![0u8; 20];
        let mut buf = InOut::split(&input, &mut output).unwrap();
        let mut chunk = [0u8; 4];
        buf.read_into(16, &mut chunk);
        assert_eq!(chunk, [16, 17, 18, 19]);
        buf.write_from(0, &chunk);
        assert_eq!(&output[..4], &[16, 17, 18, 19]);
        assert!(output[4..].iter().all(|&b| b == 0));
    }

    #[test]
    #[should_panic]
    fn out_of_range_write_panics() {
        let mut data = [0u8; 3];
        let mut buf = InOut::in_place(&mut data);
        buf.write_from(2, &[1, 2]);
    }

    #[test]
    fn block_views() {
        let mut bytes = [7u8; 48];
        assert_eq!(as_blocks(&bytes).unwrap().len(), 3);
        as_blocks_mut(&mut bytes).unwrap()[1] = [9u8; 16];
        assert_eq!(bytes[16..32], [9u8; 16]);
        assert_eq!(
            as_blocks(&bytes[..47]),
            Err(EngineError::NotBlockAligned { len: 47 })
        );
        assert!(as_blocks(&[]).unwrap().is_empty());
    }
}
