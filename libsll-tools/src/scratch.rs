use crate::error::Error;
use crate::read_full;
use std::io::Read;

/// Reusable packet buffer. It only grows, and lives as long as the conversion.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    bytes: Vec<u8>,
}

impl ScratchBuffer {
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        let mut buffer = ScratchBuffer::default();
        buffer.ensure(capacity)?;
        Ok(buffer)
    }

    /// Number of bytes the buffer can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Reserve room for at least `size` bytes, keeping the current allocation if larger.
    ///
    /// The memory is only reserved here. It is touched when a packet is read into it.
    pub fn ensure(&mut self, size: usize) -> Result<(), Error> {
        if size <= self.bytes.capacity() {
            return Ok(());
        }
        let additional = size - self.bytes.len();
        self.bytes
            .try_reserve_exact(additional)
            .map_err(|_| Error::AllocationFailure(size))?;
        debug!("scratch buffer reserved for {} bytes", size);
        Ok(())
    }

    /// Read exactly `len` bytes of the packet at `index` into the buffer.
    ///
    /// The buffer grows first if needed.
    pub fn fill_from<R: Read>(
        &mut self,
        reader: &mut R,
        len: usize,
        index: usize,
    ) -> Result<&mut [u8], Error> {
        self.ensure(len)?;
        // within capacity, this does not reallocate
        self.bytes.resize(len, 0);
        let buf = &mut self.bytes[..];
        let nread = read_full(reader, buf).map_err(Error::ReadError)?;
        if nread != len {
            return Err(Error::TruncatedPacketBody {
                index,
                read: nread,
                expected: len,
            });
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_only() {
        let mut buffer = ScratchBuffer::with_capacity(64).unwrap();
        assert!(buffer.capacity() >= 64);
        let initial = buffer.capacity();
        buffer.ensure(16).unwrap();
        assert_eq!(buffer.capacity(), initial);
        buffer.ensure(1500).unwrap();
        assert!(buffer.capacity() >= 1500);
    }

    #[test]
    fn allocation_failure() {
        let mut buffer = ScratchBuffer::default();
        let res = buffer.ensure(usize::MAX);
        assert!(matches!(res, Err(Error::AllocationFailure(usize::MAX))));
        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    fn reserve_does_not_fill() {
        // a large snapshot length only reserves address space
        let mut buffer = ScratchBuffer::default();
        buffer.ensure(1 << 30).unwrap();
        assert!(buffer.capacity() >= 1 << 30);
        assert!(buffer.bytes.is_empty());
        let data = [7u8; 8];
        let bytes = buffer.fill_from(&mut &data[..], 8, 1).unwrap();
        assert_eq!(&bytes[..], &data[..]);
        assert_eq!(buffer.bytes.len(), 8);
        assert!(buffer.capacity() >= 1 << 30);
    }

    #[test]
    fn fill() {
        let data: Vec<u8> = (0..32).collect();
        let mut reader = &data[..];
        let mut buffer = ScratchBuffer::default();
        let bytes = buffer.fill_from(&mut reader, 20, 1).unwrap();
        assert_eq!(&bytes[..], &data[..20]);
        let bytes = buffer.fill_from(&mut reader, 4, 2).unwrap();
        assert_eq!(&bytes[..], &data[20..24]);
        let res = buffer.fill_from(&mut reader, 20, 3);
        assert!(matches!(
            res,
            Err(Error::TruncatedPacketBody {
                index: 3,
                read: 8,
                expected: 20
            })
        ));
    }
}
