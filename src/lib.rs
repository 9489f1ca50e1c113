// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE.txt for details)

//! This crate implements a Chip-8 style fantasy console as if it were a real CPU
//! architecture: a 4 KiB flat memory, sixteen byte registers, a sixteen-deep call
//! stack, two 60Hz countdown timers and a 64x32 monochrome frame buffer.
//!
//! The [CPU] owns the machine state and executes decoded [Insn]s, the [Screen]
//! holds the pixels those instructions draw, and the [Emulator] drives both at
//! independently scheduled instruction, timer and render rates.

pub mod cpu;
pub mod emu;
pub mod error;
pub mod io;
pub mod screen;

pub use cpu::{
    flags::{Flags, InvalidPolicy},
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    CPU,
};
pub use emu::{Emulator, Exit, Rates, State};
pub use error::{Error, Result};
pub use io::{Headless, Platform, Signal};
pub use screen::Screen;

/// Holds the state of a Chip-8: the [CPU] and the [Screen] it draws to
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chip8 {
    /// Registers, memory, stack, timers and keys
    pub cpu: CPU,
    /// The 64x32 frame buffer
    pub screen: Screen,
}

impl Chip8 {
    /// Fetches, decodes and executes one instruction
    pub fn tick(&mut self) -> Result<&mut Self> {
        self.cpu.tick(&mut self.screen)?;
        Ok(self)
    }
}

/// Common imports for fantasy8
pub mod prelude {
    pub use super::Chip8;
    use super::*;
    pub use cpu::{mem::Region::*, CPU};
    pub use emu::{Emulator, Rates, State};
    pub use error::{Error, Result};
    pub use io::{Headless, Platform, Signal};
    pub use screen::Screen;
}
