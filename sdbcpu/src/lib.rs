pub mod memory;
pub mod reg;

use thiserror::Error;

use crate::memory::{Memory, PMEM_BASE};
use crate::reg::RegisterFile;

/// Machine word; registers and addresses are both this wide.
pub type Word = u32;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address {0:#010x} is out of bound of pmem")]
    OutOfBound(Word),
    #[error("image of {image} bytes does not fit in {size} bytes of memory")]
    ImageTooLarge { image: usize, size: usize },
}

pub type MemoryResult<T> = Result<T, MemoryError>;

/// Machine state an expression can observe.
pub trait Machine {
    /// Value of the register called `name`, which may carry a leading `$`.
    fn register(&self, name: &str) -> Option<Word>;

    /// Four byte word at guest address `addr`.
    fn read_word(&self, addr: Word) -> Option<Word>;
}

/// A machine with no registers and no memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMachine;

impl Machine for NoMachine {
    fn register(&self, _name: &str) -> Option<Word> {
        None
    }

    fn read_word(&self, _addr: Word) -> Option<Word> {
        None
    }
}

/// Loaded when no image is given on the command line.
const DEFAULT_IMAGE: [Word; 5] = [
    0x0000_0297, // auipc t0,0
    0x0002_8823, // sb  zero,16(t0)
    0x0102_c503, // lbu a0,16(t0)
    0x0010_0073, // ebreak
    0xdead_beef,
];

#[derive(Debug, Clone)]
pub struct Riscv32 {
    pub regs: RegisterFile,
    pub mem:  Memory,
}

impl Riscv32 {
    /// Fresh machine holding the built-in image, `pc` at the start of memory.
    /// Fails when `msize` cannot hold that image.
    pub fn new(msize: usize) -> MemoryResult<Self> {
        let image: Vec<u8> = DEFAULT_IMAGE.iter().flat_map(|w| w.to_le_bytes()).collect();
        Self::with_image(msize, &image)
    }

    pub fn with_image(msize: usize, image: &[u8]) -> MemoryResult<Self> {
        let mut mem = Memory::new(msize);
        mem.load_image(image)?;
        Ok(Self {
            regs: RegisterFile::new(PMEM_BASE),
            mem,
        })
    }
}

impl Machine for Riscv32 {
    fn register(&self, name: &str) -> Option<Word> {
        self.regs.lookup(name)
    }

    fn read_word(&self, addr: Word) -> Option<Word> {
        self.mem.read(addr, 4)
    }
}
