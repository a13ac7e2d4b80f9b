use crate::Word;

pub const NR_GPR: usize = 32;

/// riscv32 ABI names, indexed by register number.
pub const GPR_NAMES: [&str; NR_GPR] = [
    "$0", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5",
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4", "t5",
    "t6",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegClass {
    Pc,
    Special,
    Argument,
    Saved,
    Temporary,
    Other,
}

impl RegClass {
    #[must_use]
    pub fn of(name: &str) -> Self {
        let mut chars = name.chars();
        let first = chars.next();
        let numbered = chars.next().is_some_and(|c| c.is_ascii_digit());
        match (name, first) {
            ("pc", _) => Self::Pc,
            ("sp" | "gp" | "tp", _) => Self::Special,
            (_, Some('a')) if numbered => Self::Argument,
            (_, Some('s')) if numbered => Self::Saved,
            (_, Some('t')) if numbered => Self::Temporary,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    gpr: [Word; NR_GPR],
    pc:  Word,
}

fn strip_sigil(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

impl RegisterFile {
    #[must_use]
    pub const fn new(pc: Word) -> Self {
        Self {
            gpr: [0; NR_GPR],
            pc,
        }
    }

    /// Writes are dropped for `$0`, which is hardwired to zero.
    pub fn set_gpr(&mut self, idx: usize, value: Word) {
        if let Some(slot) = self.gpr.get_mut(idx).filter(|_| idx != 0) {
            *slot = value;
        }
    }

    /// Resolves a register by ABI name. One leading `$` is optional on both
    /// the query and the table entry, so `$sp`, `sp`, `$0` and `0` all resolve.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Word> {
        let name = strip_sigil(name);
        if name == "pc" {
            return Some(self.pc);
        }
        GPR_NAMES
            .iter()
            .position(|reg| strip_sigil(reg) == name)
            .map(|idx| self.gpr[idx])
    }

    /// `pc` first, then every general purpose register in index order.
    pub fn rows(&self) -> impl Iterator<Item = (&'static str, Word, RegClass)> + '_ {
        std::iter::once(("pc", self.pc))
            .chain(GPR_NAMES.iter().copied().zip(self.gpr.iter().copied()))
            .map(|(name, value)| (name, value, RegClass::of(name)))
    }
}
