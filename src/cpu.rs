// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions


pub mod behavior;
pub mod flags;
pub mod instruction;
pub mod mem;
pub mod stack;
pub mod timer;

use self::{
    flags::{Flags, InvalidPolicy},
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    mem::{Mem, Region::*, ADDR_MASK},
    stack::Stack,
    timer::{Timer, TimerState},
};
use crate::{
    error::{Error, Result},
    screen::Screen,
};
use log::{debug, info, trace, warn};
use std::{fmt::Debug, path::Path};

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// Represents the internal state of the CPU interpreter
#[derive(Clone, PartialEq)]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to the
    /// chip-8. Includes the invalid-instruction policy and the key-wait marker.
    pub flags: Flags,
    // memory
    mem: Mem,
    stack: Stack,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    delay: Timer,
    sound: Timer,
    // I/O
    keys: [bool; 16],
    // Execution data
    cycle: usize,
    disassembler: Dis,
}

// public interface
impl CPU {
    /// Constructs a new CPU with the provided [Flags]
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let cpu = CPU::new(Flags {
    ///     on_invalid: InvalidPolicy::Skip,
    ///     ..Default::default()
    /// });
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn new(flags: Flags) -> Self {
        CPU {
            flags,
            ..Default::default()
        }
    }

    /// Loads a program from disk into the CPU's program space
    ///
    /// Returns [Error::ProgramLoadFailure] if the file can't be read,
    /// in which case nothing is changed.
    pub fn load_program(&mut self, rom: impl AsRef<Path>) -> Result<&mut Self> {
        let path = rom.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::ProgramLoadFailure {
            path: path.to_owned(),
            source,
        })?;
        self.load_program_bytes(&bytes)
    }

    /// Loads bytes into the CPU's program space, and points the pc at them
    ///
    /// Returns [Error::ProgramTooLarge] if the bytes don't fit in `0x200..0x1000`,
    /// in which case nothing is changed.
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0x00, 0xe0, 0x12, 0x00]).unwrap();
    /// assert_eq!(&[0x00, 0xe0, 0x12, 0x00], &cpu.mem().as_slice()[0x200..0x204]);
    /// assert!(cpu.load_program_bytes(&[0; 0x1000]).is_err());
    /// ```
    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<&mut Self> {
        if rom.len() > Program.len() {
            return Err(Error::ProgramTooLarge {
                len: rom.len(),
                max: Program.len(),
            });
        }
        self.mem.clear_region(Program).load_region(Program, rom)?;
        self.pc = Program.start();
        self.stack.clear();
        self.flags.keypause = None;
        info!("{} bytes read into program memory", rom.len());
        Ok(self)
    }

    /// Clears everything above the character set, and rewinds the pc
    pub fn unload(&mut self) -> &mut Self {
        self.mem.clear_region(Reserved).clear_region(Program);
        self.pc = Program.start();
        self.stack.clear();
        self.flags.keypause = None;
        info!("program unloaded");
        self
    }

    /// Presses a key, and reports whether the key's state changed.
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let mut cpu = CPU::default();
    ///
    /// // press key `7`
    /// let did_press = cpu.press(0x7).unwrap();
    /// assert!(did_press);
    ///
    /// // press key `7` again, even though it's already pressed
    /// let did_press = cpu.press(0x7).unwrap();
    /// // it was already pressed, so nothing's changed.
    /// assert!(!did_press);
    /// ```
    pub fn press(&mut self, key: usize) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        let changed = !*keyref;
        *keyref = true;
        Ok(changed)
    }

    /// Releases a key, and reports whether the key's state changed.
    /// If key is outside range `0..=0xF`, returns [Error::InvalidKey].
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let mut cpu = CPU::default();
    /// // press key `7`
    /// cpu.press(0x7).unwrap();
    /// // release key `7`
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(changed); // key released
    /// // try releasing `7` again
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(!changed); // key was not held
    /// ```
    pub fn release(&mut self, key: usize) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        let changed = *keyref;
        *keyref = false;
        Ok(changed)
    }

    /// Replaces the whole key state with a snapshot from the input source
    pub fn set_keys(&mut self, keys: [bool; 16]) {
        self.keys = keys;
    }

    /// Gets the current key state
    pub fn keys(&self) -> &[bool; 16] {
        &self.keys
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// // Create a new CPU, and set v4 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// assert_eq!(0x41, cpu.v()[4]);
    /// assert!(cpu.set_v(0x10, 0x41).is_err());
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        let gpr = self.v.get_mut(reg).ok_or(Error::InvalidRegister { reg })?;
        *gpr = value;
        Ok(())
    }

    /// Gets a general purpose register.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    pub fn get_v(&self, reg: Reg) -> Result<u8> {
        self.v
            .get(reg)
            .copied()
            .ok_or(Error::InvalidRegister { reg })
    }

    /// Gets a slice of the entire general purpose registers
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x0, 0x41).unwrap();
    /// assert_eq!(
    ///     cpu.v(),
    ///     [0x41, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    /// )
    /// ```
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Gets the stack pointer
    pub fn sp(&self) -> usize {
        self.stack.sp()
    }

    /// Gets the value in the Sound Timer register
    pub fn sound(&self) -> u8 {
        self.sound.load()
    }

    /// Gets the value in the Delay Timer register
    pub fn delay(&self) -> u8 {
        self.delay.load()
    }

    /// Whether a tone should currently be playing
    pub fn sound_active(&self) -> bool {
        self.sound.load() > 0
    }

    /// Gets the number of instructions the CPU has executed
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Gets the CPU's memory
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Gets the CPU's memory, mutably
    pub fn mem_mut(&mut self) -> &mut Mem {
        &mut self.mem
    }

    /// Returns the destination register while suspended on `Fx0A`
    pub fn awaiting_key(&self) -> Option<Reg> {
        self.flags.keypause
    }

    /// Resets the emulator.
    ///
    /// Touches the stack, pc, I, registers, timers, keys, key-wait, and cycle count.
    ///
    /// Does not touch memory or the other [Flags].
    pub fn reset(&mut self) {
        self.flags.keypause = None;
        self.stack.clear();
        self.pc = Program.start();
        self.i = 0;
        self.v = [0; 16];
        self.delay = Timer::default();
        self.sound = Timer::default();
        self.keys = [false; 16];
        self.cycle = 0;
    }

    /// Counts both timers down by one. Call this at 60Hz.
    pub fn tick_timers(&mut self) {
        self.delay.decrement();
        if let TimerState::Finished = self.sound.decrement() {
            trace!("sound timer expired");
        }
    }

    /// Executes a single instruction
    ///
    /// While suspended on a key-wait, this samples the keys instead, and
    /// resumes once any key is held.
    ///
    /// Returns [Error::InvalidInstruction] if the word at `pc` doesn't decode,
    /// unless [Flags::on_invalid] is [InvalidPolicy::Skip].
    /// Returns [Error::StackOverflow] or [Error::StackUnderflow] for a
    /// call or return that doesn't fit the stack.
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let mut cpu = CPU::default();
    /// let mut screen = Screen::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.tick(&mut screen)
    ///     .expect("0x00e0 (cls) should be a valid opcode.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// ```
    pub fn tick(&mut self, screen: &mut Screen) -> Result<&mut Self> {
        if self.flags.is_paused() {
            self.resolve_keypause();
            return Ok(self);
        }
        self.cycle += 1;
        let addr = self.pc;
        let opcode = self.mem.read_word(addr);

        // Print opcode disassembly:
        if self.flags.debug {
            debug!(
                "{:3} {:03x}: {:<36}",
                self.cycle,
                addr,
                self.disassembler.once(opcode)
            );
        }

        self.pc = self.pc.wrapping_add(2) & ADDR_MASK;
        match self.execute(screen, Insn::decode(opcode)) {
            Err(Error::InvalidInstruction { word, addr })
                if self.flags.on_invalid == InvalidPolicy::Skip =>
            {
                warn!("skipping invalid opcode {word:04x} at {addr:03x}");
            }
            result => result?,
        }
        Ok(self)
    }

    /// Stores the lowest held key, if any, into the key-wait register
    fn resolve_keypause(&mut self) -> bool {
        let Some(x) = self.flags.keypause else {
            return false;
        };
        match self.keys.iter().position(|&held| held) {
            Some(key) => {
                self.v[x] = key as u8;
                self.flags.keypause = None;
                true
            }
            None => false,
        }
    }

    /// The address of the instruction being executed
    #[inline(always)]
    fn at(&self) -> Adr {
        self.pc.wrapping_sub(2) & ADDR_MASK
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("stack", &self.stack)
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("delay", &self.delay)
            .field("sound", &self.sound)
            .field("keys", &self.keys)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a new CPU with sane defaults
    ///
    /// | value  | default | description
    /// |--------|---------|------------
    /// | font   |`0x0000` | Location of the character set.
    /// | pc     |`0x0200` | Start location.
    ///
    /// # Examples
    /// ```rust
    /// use fantasy8::*;
    /// let mut cpu = CPU::default();
    /// ```
    fn default() -> Self {
        CPU {
            flags: Flags::default(),
            mem: Mem::default(),
            stack: Stack::default(),
            pc: Program.start(),
            i: 0,
            v: [0; 16],
            delay: Timer::default(),
            sound: Timer::default(),
            keys: [false; 16],
            cycle: 0,
            disassembler: Dis::default(),
        }
    }
}
