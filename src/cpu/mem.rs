// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The Mem represents the CPU's memory
//!
//! 4 KiB, split into named [Region]s. Every access is masked to 12 bits, so
//! no address can fall outside of `0x000..=0xfff`.

use crate::error::{Error, Result};
use std::{
    fmt::{Display, Formatter},
    ops::Range,
};

/// Number of addressable bytes
pub const MEM_SIZE: usize = 0x1000;
/// Mask applied to every computed address
pub const ADDR_MASK: u16 = 0x0fff;
/// Size of a single hexadecimal glyph, in bytes
pub const GLYPH_SIZE: u16 = 5;

/// The sixteen hexadecimal glyphs, 0 through F
#[rustfmt::skip]
pub const CHARSET: [u8; 80] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// Represents a named region in memory
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    /// Hexadecimal glyph sprites
    Charset,
    /// The rest of the interpreter's reserved space
    Reserved,
    /// Program memory
    Program,
}

impl Region {
    /// The address range covered by this region
    pub const fn range(self) -> Range<usize> {
        match self {
            Region::Charset => 0x000..0x050,
            Region::Reserved => 0x050..0x200,
            Region::Program => 0x200..MEM_SIZE,
        }
    }
    /// The first address in this region
    pub const fn start(self) -> u16 {
        self.range().start as u16
    }
    /// The number of bytes in this region
    pub const fn len(self) -> usize {
        let range = self.range();
        range.end - range.start
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Region::Charset => "Charset",
                Region::Reserved => "Reserved",
                Region::Program => "Program",
            }
        )
    }
}

/// Flat, byte-addressed memory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mem {
    memory: Vec<u8>,
}

impl Default for Mem {
    /// Constructs a new [Mem] with the [CHARSET] in place
    fn default() -> Self {
        let mut mem = Mem {
            memory: vec![0; MEM_SIZE],
        };
        mem.get_region_mut(Region::Charset).copy_from_slice(&CHARSET);
        mem
    }
}

impl Mem {
    /// Constructs a new [Mem] with the [CHARSET] in place
    /// # Examples
    /// ```rust
    /// # use fantasy8::cpu::mem::*;
    /// let mem = Mem::new();
    /// assert_eq!(MEM_SIZE, mem.len());
    /// assert_eq!(0xf0, mem.read(0x000));
    /// ```
    pub fn new() -> Self {
        Mem::default()
    }

    /// Gets the length of the backing memory
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Because clippy is so kind:
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Reads the byte at `addr`, masked to 12 bits
    #[inline(always)]
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDR_MASK) as usize]
    }

    /// Writes `data` to `addr`, masked to 12 bits
    #[inline(always)]
    pub fn write(&mut self, addr: u16, data: u8) {
        self.memory[(addr & ADDR_MASK) as usize] = data;
    }

    /// Reads the big-endian instruction word at `addr`
    /// # Examples
    /// ```rust
    /// # use fantasy8::cpu::mem::*;
    /// let mut mem = Mem::new();
    /// mem.write(0x200, 0x12);
    /// mem.write(0x201, 0x34);
    /// assert_eq!(0x1234, mem.read_word(0x200));
    /// ```
    #[inline(always)]
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Loads data into the start of a named [Region]
    ///
    /// Returns [Error::ProgramTooLarge] if `data` doesn't fit, without touching memory.
    pub fn load_region(&mut self, name: Region, data: &[u8]) -> Result<&mut Self> {
        let max = name.len();
        if data.len() > max {
            return Err(Error::ProgramTooLarge {
                len: data.len(),
                max,
            });
        }
        self.get_region_mut(name)[..data.len()].copy_from_slice(data);
        Ok(self)
    }

    /// Fills a [Region] with zeroes
    pub fn clear_region(&mut self, name: Region) -> &mut Self {
        self.get_region_mut(name).fill(0);
        self
    }

    /// Gets a slice of a named [Region] of memory
    #[inline(always)]
    pub fn get_region(&self, name: Region) -> &[u8] {
        &self.memory[name.range()]
    }

    /// Gets a mutable slice of a named [Region] of memory
    #[inline(always)]
    pub fn get_region_mut(&mut self, name: Region) -> &mut [u8] {
        &mut self.memory[name.range()]
    }

    /// Gets the entire backing memory
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }
}
