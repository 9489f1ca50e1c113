// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for fantasy8

use std::path::PathBuf;
use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fantasy8.
#[derive(Debug, Error)]
pub enum Error {
    /// The program image could not be read
    #[error("failed to load program {}: {source}", path.display())]
    ProgramLoadFailure {
        /// The offending path
        path: PathBuf,
        /// What went wrong while reading it
        source: std::io::Error,
    },
    /// The program image does not fit between 0x200 and 0xfff
    #[error("program of {len} bytes exceeds the {max} bytes of program memory")]
    ProgramTooLarge {
        /// Length of the rejected image
        len: usize,
        /// Number of bytes available to programs
        max: usize,
    },
    /// A call was made with all sixteen stack slots in use
    #[error("stack overflow at {addr:03x}")]
    StackOverflow {
        /// The address of the offending call
        addr: u16,
    },
    /// A return was made with an empty stack
    #[error("stack underflow at {addr:03x}")]
    StackUnderflow {
        /// The address of the offending return
        addr: u16,
    },
    /// The word at `addr` does not decode to any instruction
    #[error("opcode {word:04x} at {addr:03x} not recognized")]
    InvalidInstruction {
        /// The offending word
        word: u16,
        /// Where it was fetched from
        addr: u16,
    },
    /// Tried to run the machine before loading a program
    #[error("no program loaded")]
    NoProgramLoaded,
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Tried to press a key that doesn't exist
    #[error("tried to press key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether this error halts the machine.
    ///
    /// Stack faults and invalid instructions are machine faults. Everything
    /// else is reported to the caller and leaves the machine as it was.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Error::StackOverflow { .. }
                | Error::StackUnderflow { .. }
                | Error::InvalidInstruction { .. }
        )
    }
}
