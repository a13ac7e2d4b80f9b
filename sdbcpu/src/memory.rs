use crate::{MemoryError, MemoryResult, Word};

/// Guest physical address of the first byte of memory.
pub const PMEM_BASE: Word = 0x8000_0000;

pub const DEFAULT_MSIZE: usize = 0x0800_0000;

/// Little-endian guest physical memory mapped at [`PMEM_BASE`].
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.bytes.len()
    }

    fn offset(&self, addr: Word, len: usize) -> Option<usize> {
        let offset = addr.checked_sub(PMEM_BASE)? as usize;
        let end = offset.checked_add(len)?;
        (end <= self.bytes.len()).then_some(offset)
    }

    /// Reads `len` (1, 2 or 4) bytes at `addr`, `None` when any byte falls
    /// outside of memory.
    #[must_use]
    pub fn read(&self, addr: Word, len: usize) -> Option<Word> {
        if !matches!(len, 1 | 2 | 4) {
            return None;
        }
        let offset = self.offset(addr, len)?;
        let word = self.bytes[offset..offset + len]
            .iter()
            .rev()
            .fold(0, |acc, &byte| (acc << 8) | Word::from(byte));
        Some(word)
    }

    /// Copies a raw image to the start of memory and returns its length.
    pub fn load_image(&mut self, image: &[u8]) -> MemoryResult<usize> {
        let size = self.size();
        let dst = self
            .bytes
            .get_mut(..image.len())
            .ok_or(MemoryError::ImageTooLarge {
                image: image.len(),
                size,
            })?;
        dst.copy_from_slice(image);
        Ok(image.len())
    }
}
