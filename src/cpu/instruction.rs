// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Contains the definition of a Chip-8 [Insn], and the decoder that produces one

pub mod disassembler;

use super::{Adr, Nib, Reg};
use std::fmt::Display;

/// Extracts the I nibble of an IXYN instruction
#[inline]
pub fn i(ins: u16) -> Nib {
    (ins >> 12 & 0xf) as Nib
}
/// Extracts the X nibble of an IXYN instruction
#[inline]
pub fn x(ins: u16) -> Reg {
    (ins >> 8 & 0xf) as Reg
}
/// Extracts the Y nibble of an IXYN instruction
#[inline]
pub fn y(ins: u16) -> Reg {
    (ins >> 4 & 0xf) as Reg
}
/// Extracts the N nibble of an IXYN instruction
#[inline]
pub fn n(ins: u16) -> Nib {
    (ins & 0xf) as Nib
}
/// Extracts the B byte of an IXBB instruction
#[inline]
pub fn b(ins: u16) -> u8 {
    (ins & 0xff) as u8
}
/// Extracts the ADR trinibble of an IADR instruction
#[inline]
pub fn a(ins: u16) -> Adr {
    ins & 0x0fff
}

/// A decoded Chip-8 instruction
///
/// Every 16-bit word decodes to exactly one variant; words with no meaning
/// become [Insn::unknown].
#[allow(non_camel_case_types, missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Insn {
    /// | 00e0 | Clear screen memory to 0s
    cls,
    /// | 00ee | Return from subroutine
    ret,
    /// | 0aaa | Call machine-code routine (ignored)
    sys { a: Adr },
    /// | 1aaa | Jumps to an absolute address
    jmp { a: Adr },
    /// | 2aaa | Pushes pc onto the stack, then jumps to a
    call { a: Adr },
    /// | 3xbb | Skips next instruction if register X == b
    seb { x: Reg, b: u8 },
    /// | 4xbb | Skips next instruction if register X != b
    sneb { x: Reg, b: u8 },
    /// | 5xy0 | Skip next instruction if vX == vY
    se { x: Reg, y: Reg },
    /// | 6xbb | Loads immediate byte b into register vX
    movb { x: Reg, b: u8 },
    /// | 7xbb | Adds immediate byte b to register vX
    addb { x: Reg, b: u8 },
    /// | 8xy0 | Loads the value of y into x
    mov { x: Reg, y: Reg },
    /// | 8xy1 | Performs bitwise or of vX and vY, and stores the result in vX
    or { x: Reg, y: Reg },
    /// | 8xy2 | Performs bitwise and of vX and vY, and stores the result in vX
    and { x: Reg, y: Reg },
    /// | 8xy3 | Performs bitwise xor of vX and vY, and stores the result in vX
    xor { x: Reg, y: Reg },
    /// | 8xy4 | Performs addition of vX and vY, and stores the result in vX
    add { x: Reg, y: Reg },
    /// | 8xy5 | Performs subtraction of vX and vY, and stores the result in vX
    sub { x: Reg, y: Reg },
    /// | 8xy6 | Performs bitwise right shift of vX
    shr { x: Reg, y: Reg },
    /// | 8xy7 | Performs subtraction of vY and vX, and stores the result in vX
    bsub { x: Reg, y: Reg },
    /// | 8xyE | Performs bitwise left shift of vX
    shl { x: Reg, y: Reg },
    /// | 9xy0 | Skip next instruction if vX != vY
    sne { x: Reg, y: Reg },
    /// | Aaaa | Load address #a into register I
    movI { a: Adr },
    /// | Baaa | Jump to &adr + v0
    jmpr { a: Adr },
    /// | Cxbb | Stores a random number & the provided byte into vX
    rand { x: Reg, b: u8 },
    /// | Dxyn | Draws n-byte sprite to the screen at coordinates (vX, vY)
    draw { x: Reg, y: Reg, n: Nib },
    /// | eX9e | Skip next instruction if key vX is held
    sek { x: Reg },
    /// | eXa1 | Skip next instruction if key vX is not held
    snek { x: Reg },
    /// | fX07 | Set vX to value in delay timer
    getdt { x: Reg },
    /// | fX0a | Wait for input, store key in vX
    waitk { x: Reg },
    /// | fX15 | Set delay timer to the value in vX
    setdt { x: Reg },
    /// | fX18 | Set sound timer to the value in vX
    movst { x: Reg },
    /// | fX1e | Add vX to I
    addI { x: Reg },
    /// | fX29 | Load sprite for character x into I
    font { x: Reg },
    /// | fX33 | BCD convert X into I[0..3]
    bcd { x: Reg },
    /// | fX55 | DMA Stor from I to registers 0..=X
    dmao { x: Reg },
    /// | fX65 | DMA Load from I to registers 0..=X
    dmai { x: Reg },
    /// A word with no defined meaning
    unknown { word: u16 },
}

impl Insn {
    /// Decodes a single instruction word. Never fails.
    ///
    /// # Examples
    /// ```rust
    /// # use fantasy8::Insn;
    /// assert_eq!(Insn::jmp { a: 0x234 }, Insn::decode(0x1234));
    /// assert_eq!(Insn::add { x: 0xa, y: 0xb }, Insn::decode(0x8ab4));
    /// assert_eq!(Insn::unknown { word: 0x800f }, Insn::decode(0x800f));
    /// ```
    pub fn decode(opcode: u16) -> Insn {
        let (i, x, y, n, b, a) = (
            i(opcode),
            x(opcode),
            y(opcode),
            n(opcode),
            b(opcode),
            a(opcode),
        );
        match i {
            // |opcode| effect                             |
            // |------|------------------------------------|
            // | 00e0 | Clear screen memory to all 0       |
            // | 00ee | Return from subroutine             |
            // | 0aaa | Machine-code routine               |
            0x0 => match a {
                0x0e0 => Insn::cls,
                0x0ee => Insn::ret,
                _ => Insn::sys { a },
            },
            0x1 => Insn::jmp { a },
            0x2 => Insn::call { a },
            0x3 => Insn::seb { x, b },
            0x4 => Insn::sneb { x, b },
            0x5 if n == 0 => Insn::se { x, y },
            0x6 => Insn::movb { x, b },
            0x7 => Insn::addb { x, b },
            // |opcode| effect                             |
            // |------|------------------------------------|
            // | 8xy0 | X = Y                              |
            // | 8xy1 | X = X | Y                          |
            // | 8xy2 | X = X & Y                          |
            // | 8xy3 | X = X ^ Y                          |
            // | 8xy4 | X = X + Y; Set vF=carry            |
            // | 8xy5 | X = X - Y; Set vF=!borrow          |
            // | 8xy6 | X = X >> 1; Set vF=bit out         |
            // | 8xy7 | X = Y - X; Set vF=!borrow          |
            // | 8xyE | X = X << 1; Set vF=bit out         |
            0x8 => match n {
                0x0 => Insn::mov { x, y },
                0x1 => Insn::or { x, y },
                0x2 => Insn::and { x, y },
                0x3 => Insn::xor { x, y },
                0x4 => Insn::add { x, y },
                0x5 => Insn::sub { x, y },
                0x6 => Insn::shr { x, y },
                0x7 => Insn::bsub { x, y },
                0xe => Insn::shl { x, y },
                _ => Insn::unknown { word: opcode },
            },
            0x9 if n == 0 => Insn::sne { x, y },
            0xa => Insn::movI { a },
            0xb => Insn::jmpr { a },
            0xc => Insn::rand { x, b },
            0xd => Insn::draw { x, y, n },
            0xe => match b {
                0x9e => Insn::sek { x },
                0xa1 => Insn::snek { x },
                _ => Insn::unknown { word: opcode },
            },
            0xf => match b {
                0x07 => Insn::getdt { x },
                0x0a => Insn::waitk { x },
                0x15 => Insn::setdt { x },
                0x18 => Insn::movst { x },
                0x1e => Insn::addI { x },
                0x29 => Insn::font { x },
                0x33 => Insn::bcd { x },
                0x55 => Insn::dmao { x },
                0x65 => Insn::dmai { x },
                _ => Insn::unknown { word: opcode },
            },
            _ => Insn::unknown { word: opcode },
        }
    }

    /// Returns true if this is an [Insn::unknown]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Insn::unknown { .. })
    }
}

impl From<u16> for Insn {
    fn from(word: u16) -> Self {
        Insn::decode(word)
    }
}

impl Display for Insn {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insn::cls               => write!(f, "cls    "),
            Insn::ret               => write!(f, "ret    "),
            Insn::sys { a }         => write!(f, "sys    {a:03x}"),
            Insn::jmp { a }         => write!(f, "jmp    {a:03x}"),
            Insn::call { a }        => write!(f, "call   {a:03x}"),
            Insn::seb { x, b }      => write!(f, "se     #{b:02x}, v{x:X}"),
            Insn::sneb { x, b }     => write!(f, "sne    #{b:02x}, v{x:X}"),
            Insn::se { x, y }       => write!(f, "se     v{y:X}, v{x:X}"),
            Insn::movb { x, b }     => write!(f, "mov    #{b:02x}, v{x:X}"),
            Insn::addb { x, b }     => write!(f, "add    #{b:02x}, v{x:X}"),
            Insn::mov { x, y }      => write!(f, "mov    v{y:X}, v{x:X}"),
            Insn::or { x, y }       => write!(f, "or     v{y:X}, v{x:X}"),
            Insn::and { x, y }      => write!(f, "and    v{y:X}, v{x:X}"),
            Insn::xor { x, y }      => write!(f, "xor    v{y:X}, v{x:X}"),
            Insn::add { x, y }      => write!(f, "add    v{y:X}, v{x:X}"),
            Insn::sub { x, y }      => write!(f, "sub    v{y:X}, v{x:X}"),
            Insn::shr { x, .. }     => write!(f, "shr    v{x:X}"),
            Insn::bsub { x, y }     => write!(f, "bsub   v{y:X}, v{x:X}"),
            Insn::shl { x, .. }     => write!(f, "shl    v{x:X}"),
            Insn::sne { x, y }      => write!(f, "sne    v{y:X}, v{x:X}"),
            Insn::movI { a }        => write!(f, "mov    ${a:03x}, I"),
            Insn::jmpr { a }        => write!(f, "jmp    ${a:03x}+v0"),
            Insn::rand { x, b }     => write!(f, "rand   #{b:02x}, v{x:X}"),
            Insn::draw { x, y, n }  => write!(f, "draw   #{n:x}, v{x:X}, v{y:X}"),
            Insn::sek { x }         => write!(f, "sek    v{x:X}"),
            Insn::snek { x }        => write!(f, "snek   v{x:X}"),
            Insn::getdt { x }       => write!(f, "mov    DT, v{x:X}"),
            Insn::waitk { x }       => write!(f, "waitk  v{x:X}"),
            Insn::setdt { x }       => write!(f, "mov    v{x:X}, DT"),
            Insn::movst { x }       => write!(f, "mov    v{x:X}, ST"),
            Insn::addI { x }        => write!(f, "add    v{x:X}, I"),
            Insn::font { x }        => write!(f, "font   v{x:X}, I"),
            Insn::bcd { x }         => write!(f, "bcd    v{x:X}, &I"),
            Insn::dmao { x }        => write!(f, "dmao   v{x:X}"),
            Insn::dmai { x }        => write!(f, "dmai   v{x:X}"),
            Insn::unknown { word }  => write!(f, "inval  {word:04x}"),
        }
    }
}
