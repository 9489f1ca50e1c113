//! Represents flags that aid in implementation but aren't a part of the Chip-8 itself

use super::Reg;

/// What the [super::CPU] does when it fetches a word that isn't an instruction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidPolicy {
    /// Stop, and report [crate::Error::InvalidInstruction]
    #[default]
    Halt,
    /// Log a warning and carry on with the next word
    Skip,
}

/// Represents flags that aid in operation, but aren't inherent to the CPU
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags {
    /// Set when debug (live disassembly) mode enabled
    pub debug: bool,
    /// Set to the destination register while the CPU waits for a keypress
    pub keypause: Option<Reg>,
    /// Selects how invalid instructions are handled
    pub on_invalid: InvalidPolicy,
}

impl Flags {
    /// Toggles debug mode
    ///
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(false, cpu.flags.debug);
    /// // Toggle debug mode
    /// cpu.flags.debug();
    /// assert_eq!(true, cpu.flags.debug);
    /// ```
    pub fn debug(&mut self) {
        self.debug = !self.debug
    }

    /// Returns true while the CPU is suspended on a key-wait
    pub fn is_paused(&self) -> bool {
        self.keypause.is_some()
    }
}
