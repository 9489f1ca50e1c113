// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Contains implementations for each Chip-8 [Insn]
//!
//! By the time any of these run, `pc` already points at the next instruction.

use super::{mem::GLYPH_SIZE, *};
use rand::random;

impl CPU {
    /// Executes a single [Insn]
    #[rustfmt::skip]
    #[inline(always)]
    pub(super) fn execute(&mut self, screen: &mut Screen, instruction: Insn) -> Result<()> {
        match instruction {
            Insn::cls               => self.clear_screen(screen),
            Insn::ret               => self.ret()?,
            Insn::sys   {       a } => self.sys(a),
            Insn::jmp   {       a } => self.jump(a),
            Insn::call  {       a } => self.call(a)?,
            Insn::seb   { x,    b } => self.skip_equals_immediate(x, b),
            Insn::sneb  { x,    b } => self.skip_not_equals_immediate(x, b),
            Insn::se    { x, y    } => self.skip_equals(x, y),
            Insn::movb  { x,    b } => self.load_immediate(x, b),
            Insn::addb  { x,    b } => self.add_immediate(x, b),
            Insn::mov   { x, y    } => self.load(x, y),
            Insn::or    { x, y    } => self.or(x, y),
            Insn::and   { x, y    } => self.and(x, y),
            Insn::xor   { x, y    } => self.xor(x, y),
            Insn::add   { x, y    } => self.add(x, y),
            Insn::sub   { x, y    } => self.sub(x, y),
            Insn::shr   { x, ..   } => self.shift_right(x),
            Insn::bsub  { x, y    } => self.backwards_sub(x, y),
            Insn::shl   { x, ..   } => self.shift_left(x),
            Insn::sne   { x, y    } => self.skip_not_equals(x, y),
            Insn::movI  {       a } => self.load_i_immediate(a),
            Insn::jmpr  {       a } => self.jump_indexed(a),
            Insn::rand  { x,    b } => self.rand(x, b),
            Insn::draw  { x, y, n } => self.draw(x, y, n, screen),
            Insn::sek   { x       } => self.skip_key_equals(x),
            Insn::snek  { x       } => self.skip_key_not_equals(x),
            Insn::getdt { x       } => self.load_delay_timer(x),
            Insn::waitk { x       } => self.wait_for_key(x),
            Insn::setdt { x       } => self.store_delay_timer(x),
            Insn::movst { x       } => self.store_sound_timer(x),
            Insn::addI  { x       } => self.add_i(x),
            Insn::font  { x       } => self.load_sprite(x),
            Insn::bcd   { x       } => self.bcd_convert(x),
            Insn::dmao  { x       } => self.store_dma(x),
            Insn::dmai  { x       } => self.load_dma(x),
            Insn::unknown { word  } => {
                return Err(Error::InvalidInstruction { word, addr: self.at() })
            }
        }
        Ok(())
    }
}

/// |`0aaa`| Issues a "System call" (ML routine)
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`00e0`| Clear screen memory to all 0       |
/// |`00ee`| Return from subroutine             |
impl CPU {
    /// |`00e0`| Clears the screen memory to 0
    #[inline(always)]
    pub(super) fn clear_screen(&mut self, screen: &mut Screen) {
        screen.clear();
    }
    /// |`00ee`| Returns from subroutine
    #[inline(always)]
    pub(super) fn ret(&mut self) -> Result<()> {
        let addr = self.at();
        self.pc = self.stack.pop().ok_or(Error::StackUnderflow { addr })?;
        Ok(())
    }
    /// |`0aaa`| Machine-code routines can't run here, so this does nothing
    #[inline(always)]
    pub(super) fn sys(&mut self, a: Adr) {
        warn!("ignoring machine-code call to {a:03x} at {:03x}", self.at());
    }
}

/// |`1aaa`| Sets pc to an absolute address
impl CPU {
    /// |`1aaa`| Sets the program counter to an absolute address
    #[inline(always)]
    pub(super) fn jump(&mut self, a: Adr) {
        self.pc = a & ADDR_MASK;
    }
}

/// |`2aaa`| Pushes pc onto the stack, then jumps to a
impl CPU {
    /// |`2aaa`| Pushes pc onto the stack, then jumps to a
    ///
    /// The pushed address is that of the instruction after the call.
    #[inline(always)]
    pub(super) fn call(&mut self, a: Adr) -> Result<()> {
        let addr = self.at();
        self.stack
            .push(self.pc)
            .map_err(|_| Error::StackOverflow { addr })?;
        self.jump(a);
        Ok(())
    }
}

/// |`3xbb`|, |`4xbb`|, |`5xy0`|, |`9xy0`| Conditional skips
impl CPU {
    #[inline(always)]
    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2) & ADDR_MASK;
        }
    }
    /// |`3xbb`| Skips the next instruction if register X == b
    #[inline(always)]
    pub(super) fn skip_equals_immediate(&mut self, x: Reg, b: u8) {
        self.skip_if(self.v[x] == b)
    }
    /// |`4xbb`| Skips the next instruction if register X != b
    #[inline(always)]
    pub(super) fn skip_not_equals_immediate(&mut self, x: Reg, b: u8) {
        self.skip_if(self.v[x] != b)
    }
    /// |`5xy0`| Skips the next instruction if register X == register Y
    #[inline(always)]
    pub(super) fn skip_equals(&mut self, x: Reg, y: Reg) {
        self.skip_if(self.v[x] == self.v[y])
    }
    /// |`9xy0`| Skip next instruction if X != y
    #[inline(always)]
    pub(super) fn skip_not_equals(&mut self, x: Reg, y: Reg) {
        self.skip_if(self.v[x] != self.v[y])
    }
}

/// |`6xbb`| Loads immediate byte b into register vX
impl CPU {
    /// |`6xbb`| Loads immediate byte b into register vX
    #[inline(always)]
    pub(super) fn load_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = b;
    }
}

/// |`7xbb`| Adds immediate byte b to register vX
impl CPU {
    /// |`7xbb`| Adds immediate byte b to register vX. Never touches vF.
    #[inline(always)]
    pub(super) fn add_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = self.v[x].wrapping_add(b);
    }
}

/// |`8xyn`| Performs ALU operation
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`8xy0`| X = Y                              |
/// |`8xy1`| X = X | Y                          |
/// |`8xy2`| X = X & Y                          |
/// |`8xy3`| X = X ^ Y                          |
/// |`8xy4`| X = X + Y; Set vF=carry            |
/// |`8xy5`| X = X - Y; Set vF=X > Y            |
/// |`8xy6`| X = X >> 1; Set vF=bit out         |
/// |`8xy7`| X = Y - X; Set vF=Y > X            |
/// |`8xyE`| X = X << 1; Set vF=bit out         |
///
/// vF is always written after vX, so `8Fyn` leaves only the flag behind.
impl CPU {
    /// |`8xy0`| Loads the value of y into x
    #[inline(always)]
    pub(super) fn load(&mut self, x: Reg, y: Reg) {
        self.v[x] = self.v[y];
    }
    /// |`8xy1`| Performs bitwise or of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn or(&mut self, x: Reg, y: Reg) {
        self.v[x] |= self.v[y];
    }
    /// |`8xy2`| Performs bitwise and of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn and(&mut self, x: Reg, y: Reg) {
        self.v[x] &= self.v[y];
    }
    /// |`8xy3`| Performs bitwise xor of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn xor(&mut self, x: Reg, y: Reg) {
        self.v[x] ^= self.v[y];
    }
    /// |`8xy4`| Performs addition of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn add(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.v[x], carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[0xf] = carry.into();
    }
    /// |`8xy5`| Performs subtraction of vX and vY, and stores the result in vX
    ///
    /// vF is set only when vX is strictly greater than vY.
    #[inline(always)]
    pub(super) fn sub(&mut self, x: Reg, y: Reg) {
        let (a, b) = (self.v[x], self.v[y]);
        self.v[x] = a.wrapping_sub(b);
        self.v[0xf] = (a > b).into();
    }
    /// |`8xy6`| Performs bitwise right shift of vX
    #[inline(always)]
    pub(super) fn shift_right(&mut self, x: Reg) {
        let shift_out = self.v[x] & 1;
        self.v[x] >>= 1;
        self.v[0xf] = shift_out;
    }
    /// |`8xy7`| Performs subtraction of vY and vX, and stores the result in vX
    ///
    /// vF is set only when vY is strictly greater than vX.
    #[inline(always)]
    pub(super) fn backwards_sub(&mut self, x: Reg, y: Reg) {
        let (a, b) = (self.v[x], self.v[y]);
        self.v[x] = b.wrapping_sub(a);
        self.v[0xf] = (b > a).into();
    }
    /// |`8xyE`| Performs bitwise left shift of vX
    #[inline(always)]
    pub(super) fn shift_left(&mut self, x: Reg) {
        let shift_out = self.v[x] >> 7;
        self.v[x] <<= 1;
        self.v[0xf] = shift_out;
    }
}

/// |`Aaaa`| Load address #a into register I
impl CPU {
    /// |`Aadr`| Load address #adr into register I
    #[inline(always)]
    pub(super) fn load_i_immediate(&mut self, a: Adr) {
        self.i = a & ADDR_MASK;
    }
}

/// |`Baaa`| Jump to &adr + v0
impl CPU {
    /// |`Badr`| Jump to &adr + v0, masked to 12 bits
    #[inline(always)]
    pub(super) fn jump_indexed(&mut self, a: Adr) {
        self.jump(a.wrapping_add(self.v[0] as Adr));
    }
}

/// |`Cxbb`| Stores a random number & the provided byte into vX
impl CPU {
    /// |`Cxbb`| Stores a random number & the provided byte into vX
    #[inline(always)]
    pub(super) fn rand(&mut self, x: Reg, b: u8) {
        self.v[x] = random::<u8>() & b;
    }
}

/// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
impl CPU {
    /// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
    ///
    /// Each row is read from `I + row`. Every pixel wraps around the screen
    /// edges on its own, so a sprite hanging off the right edge continues on
    /// the left of the same row. vF is set if any lit pixel was erased.
    /// Bit b is `byte >> (7 - b)` and wraps at `x >= WIDTH`; an `8 - b` shift or a `> WIDTH` test is off by one.
    #[inline(always)]
    pub(super) fn draw(&mut self, x: Reg, y: Reg, n: Nib, screen: &mut Screen) {
        let (x, y) = (self.v[x] as usize, self.v[y] as usize);
        let mut collision = false;
        for row in 0..n as usize {
            let sprite = self.mem.read(self.i.wrapping_add(row as Adr));
            for bit in 0..8 {
                let lit = sprite & (0x80 >> bit) != 0;
                collision |= screen.xor(x + bit, y + row, lit);
            }
        }
        self.v[0xf] = collision.into();
    }
}

/// |`Exbb`| Skips instruction on value of keypress
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`eX9e`| Skip next instruction if key vX is held     |
/// |`eXa1`| Skip next instruction if key vX is not held |
impl CPU {
    /// |`Ex9E`| Skip next instruction if key vX is held
    #[inline(always)]
    pub(super) fn skip_key_equals(&mut self, x: Reg) {
        self.skip_if(self.keys[self.v[x] as usize & 0xf])
    }
    /// |`ExA1`| Skip next instruction if key vX is not held
    #[inline(always)]
    pub(super) fn skip_key_not_equals(&mut self, x: Reg) {
        self.skip_if(!self.keys[self.v[x] as usize & 0xf])
    }
}

/// |`Fxbb`| Performs IO
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`fX07`| Set vX to value in delay timer     |
/// |`fX0a`| Wait for input, store key in vX    |
/// |`fX15`| Set delay timer to the value in vX |
/// |`fX18`| Set sound timer to the value in vX |
/// |`fX1e`| Add vX to I                        |
/// |`fX29`| Load sprite for character x into I |
/// |`fX33`| BCD convert X into I[0..3]         |
/// |`fX55`| DMA Stor from I to registers 0..=X |
/// |`fX65`| DMA Load from I to registers 0..=X |
impl CPU {
    /// |`Fx07`| Get the current DT, and put it in vX
    /// ```py
    /// vX = DT
    /// ```
    #[inline(always)]
    pub(super) fn load_delay_timer(&mut self, x: Reg) {
        self.v[x] = self.delay.load();
    }
    /// |`Fx0A`| Wait for key, then vX = K
    ///
    /// If no key is held, the CPU suspends until one is (see [CPU::tick]).
    #[inline(always)]
    pub(super) fn wait_for_key(&mut self, x: Reg) {
        self.flags.keypause = Some(x);
        self.resolve_keypause();
    }
    /// |`Fx15`| Load vX into DT
    /// ```py
    /// DT = vX
    /// ```
    #[inline(always)]
    pub(super) fn store_delay_timer(&mut self, x: Reg) {
        self.delay.store(self.v[x]);
    }
    /// |`Fx18`| Load vX into ST
    /// ```py
    /// ST = vX;
    /// ```
    #[inline(always)]
    pub(super) fn store_sound_timer(&mut self, x: Reg) {
        self.sound.store(self.v[x]);
    }
    /// |`Fx1e`| Add vX to I,
    /// ```py
    /// I += vX;
    /// ```
    #[inline(always)]
    pub(super) fn add_i(&mut self, x: Reg) {
        self.i = self.i.wrapping_add(self.v[x] as Adr) & ADDR_MASK;
    }
    /// |`Fx29`| Load sprite for character x into I
    /// ```py
    /// I = sprite(X);
    /// ```
    #[inline(always)]
    pub(super) fn load_sprite(&mut self, x: Reg) {
        self.i = Charset.start() + GLYPH_SIZE * (self.v[x] as Adr & 0xf);
    }
    /// |`Fx33`| BCD convert X into I`[0..3]`
    #[inline(always)]
    pub(super) fn bcd_convert(&mut self, x: Reg) {
        let x = self.v[x];
        self.mem.write(self.i, x / 100);
        self.mem.write(self.i.wrapping_add(1), x / 10 % 10);
        self.mem.write(self.i.wrapping_add(2), x % 10);
    }
    /// |`Fx55`| DMA Stor from I to registers 0..=X
    ///
    /// I is left as it was.
    #[inline(always)]
    pub(super) fn store_dma(&mut self, x: Reg) {
        for reg in 0..=x {
            self.mem.write(self.i.wrapping_add(reg as Adr), self.v[reg]);
        }
    }
    /// |`Fx65`| DMA Load from I to registers 0..=X
    ///
    /// I is left as it was.
    #[inline(always)]
    pub(super) fn load_dma(&mut self, x: Reg) {
        for reg in 0..=x {
            self.v[reg] = self.mem.read(self.i.wrapping_add(reg as Adr));
        }
    }
}
