// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Drives a [Chip8] through its lifecycle, at three independent rates
//!
//! | rate         | default          | what happens
//! |--------------|------------------|-------------
//! | instructions | unbounded        | fetch, decode, execute
//! | timers       | 60Hz             | delay and sound timers count down
//! | frames       | 100Hz            | the [Screen] is handed to the [Platform]

use crate::{
    cpu::flags::Flags,
    error::{Error, Result},
    io::{Platform, Signal},
    screen::Screen,
    Chip8, CPU,
};
use log::{error, info};
use std::{
    path::Path,
    time::{Duration, Instant},
};

/// Where the machine is in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// No program is loaded. Nothing will run.
    #[default]
    Idle,
    /// A program is loaded, and running
    Running,
    /// Suspended on `Fx0A` until a key is held
    AwaitingKey,
    /// Stopped by a fault. Load or unload a program to leave this state.
    Halted,
}

/// Why [Emulator::run] returned
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Exit {
    /// The platform signalled [Signal::Stop]
    Stopped,
    /// The platform signalled [Signal::Stop] while the machine waited for a key.
    /// The wait is still pending, and resumes on the next run.
    Cancelled,
    /// The machine was already halted by an earlier fault
    Halted,
}

/// How fast each part of the machine runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rates {
    /// Instructions per second. [None] runs as fast as the host allows.
    pub ips: Option<u32>,
    /// The most instructions run between two polls of the [Platform]
    pub burst: usize,
    /// Timer decrements per second
    pub timer_hz: u32,
    /// Frames rendered per second
    pub frame_hz: u32,
}

impl Default for Rates {
    fn default() -> Self {
        Rates {
            ips: None,
            burst: 16,
            timer_hz: 60,
            frame_hz: 100,
        }
    }
}

/// A fixed-period clock. Deadlines advance by whole periods, so the rate
/// doesn't drift with the loop's own timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cadence {
    period: Duration,
    next: Instant,
}

impl Cadence {
    fn new(hz: u32, now: Instant) -> Self {
        // rates past 1 GHz still tick once per nanosecond
        let period = Duration::from_nanos((1_000_000_000 / u64::from(hz.max(1))).max(1));
        Cadence {
            period,
            next: now + period,
        }
    }

    /// Counts the periods which elapsed before `now`, up to `limit`.
    ///
    /// Any backlog past `limit` is dropped, and the clock restarts from `now`.
    fn due(&mut self, now: Instant, limit: u32) -> u32 {
        if now < self.next {
            return 0;
        }
        let behind = (now - self.next).as_nanos() / self.period.as_nanos() + 1;
        match u32::try_from(behind) {
            Ok(count) if count <= limit => {
                self.next += self.period * count;
                count
            }
            _ => {
                self.next = now + self.period;
                limit
            }
        }
    }
}

/// Work that came due in one pass of the run loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Due {
    /// Instructions to execute
    pub instructions: usize,
    /// Timer decrements to apply
    pub timer_ticks: u32,
    /// Whether to hand a frame to the platform
    pub render: bool,
}

/// Splits wall-clock time into instruction, timer and frame deadlines
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduler {
    instructions: Option<Cadence>,
    burst: usize,
    timers: Cadence,
    frames: Cadence,
}

impl Scheduler {
    /// Starts every clock at `now`
    pub fn new(rates: &Rates, now: Instant) -> Self {
        Scheduler {
            instructions: rates.ips.map(|ips| Cadence::new(ips, now)),
            burst: rates.burst.max(1),
            timers: Cadence::new(rates.timer_hz, now),
            frames: Cadence::new(rates.frame_hz, now),
        }
    }

    /// Collects the work due at `now`
    /// # Examples
    /// ```rust
    /// # use fantasy8::{*, emu::Scheduler};
    /// # use std::time::{Duration, Instant};
    /// let start = Instant::now();
    /// let rates = Rates { ips: Some(600), ..Default::default() };
    /// let mut scheduler = Scheduler::new(&rates, start);
    /// let due = scheduler.poll(start + Duration::from_millis(50));
    /// assert_eq!(3, due.timer_ticks);
    /// assert_eq!(16, due.instructions); // capped at one burst
    /// assert!(due.render);
    /// ```
    pub fn poll(&mut self, now: Instant) -> Due {
        let burst = u32::try_from(self.burst).unwrap_or(u32::MAX);
        Due {
            instructions: match &mut self.instructions {
                Some(cadence) => cadence.due(now, burst) as usize,
                None => self.burst,
            },
            timer_ticks: self.timers.due(now, u8::MAX.into()),
            render: self.frames.due(now, 1) > 0,
        }
    }

    /// How long the loop may sleep before something else comes due.
    ///
    /// With no instruction rate, instructions are always due, so this is zero
    /// unless `suspended` says no instructions can run.
    pub fn idle_for(&self, now: Instant, suspended: bool) -> Duration {
        let next = self.timers.next.min(self.frames.next);
        let next = match (&self.instructions, suspended) {
            (_, true) => next,
            (Some(cadence), false) => next.min(cadence.next),
            (None, false) => return Duration::ZERO,
        };
        next.saturating_duration_since(now)
    }
}

/// Owns a [Chip8], and runs it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Emulator {
    /// The machine being run
    pub chip8: Chip8,
    /// How fast to run it
    pub rates: Rates,
    state: State,
}

impl Emulator {
    /// Constructs an idle emulator with the provided [Flags] and [Rates]
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let emu = Emulator::new(Flags::default(), Rates::default());
    /// assert_eq!(State::Idle, emu.state());
    /// ```
    pub fn new(flags: Flags, rates: Rates) -> Self {
        Emulator {
            chip8: Chip8 {
                cpu: CPU::new(flags),
                screen: Screen::default(),
            },
            rates,
            state: State::Idle,
        }
    }

    /// Gets the lifecycle [State]
    pub fn state(&self) -> State {
        match self.state {
            State::Running if self.chip8.cpu.awaiting_key().is_some() => State::AwaitingKey,
            state => state,
        }
    }

    /// Gets the CPU
    pub fn cpu(&self) -> &CPU {
        &self.chip8.cpu
    }

    /// Gets the screen
    pub fn screen(&self) -> &Screen {
        &self.chip8.screen
    }

    /// Loads a program from disk, and starts running it.
    ///
    /// On failure, nothing changes.
    pub fn load_program(&mut self, rom: impl AsRef<Path>) -> Result<&mut Self> {
        self.chip8.cpu.load_program(rom)?;
        self.state = State::Running;
        Ok(self)
    }

    /// Loads a program from memory, and starts running it.
    ///
    /// On failure, nothing changes.
    /// # Examples
    /// ```rust
    /// # use fantasy8::*;
    /// let mut emu = Emulator::default();
    /// emu.load_program_bytes(&[0x12, 0x00]).unwrap();
    /// assert_eq!(State::Running, emu.state());
    /// ```
    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.chip8.cpu.load_program_bytes(rom)?;
        self.state = State::Running;
        Ok(self)
    }

    /// Clears program memory, and goes back to [State::Idle]
    pub fn unload(&mut self) -> &mut Self {
        self.chip8.cpu.unload();
        self.state = State::Idle;
        self
    }

    /// Executes a single instruction, or samples keys while awaiting one.
    ///
    /// Returns [Error::NoProgramLoaded] while [State::Idle], without changing
    /// anything. A fault moves the machine to [State::Halted] and is returned.
    pub fn step(&mut self) -> Result<State> {
        match self.state {
            State::Idle => return Err(Error::NoProgramLoaded),
            State::Halted => return Ok(State::Halted),
            _ => {}
        }
        if let Err(e) = self.chip8.tick().map(|_| ()) {
            if e.is_fault() {
                error!("{e}");
                self.state = State::Halted;
            }
            return Err(e);
        }
        Ok(self.state())
    }

    /// Counts both timers down by one
    pub fn tick_timers(&mut self) {
        self.chip8.cpu.tick_timers()
    }

    /// Runs until the platform signals [Signal::Stop], or the machine faults
    ///
    /// Each pass polls the platform for keys, runs the instructions and timer
    /// ticks that came due, and renders if a frame came due.
    pub fn run(&mut self, platform: &mut impl Platform) -> Result<Exit> {
        match self.state {
            State::Idle => return Err(Error::NoProgramLoaded),
            State::Halted => return Ok(Exit::Halted),
            _ => {}
        }
        info!("running at {:?}", self.rates);
        let mut scheduler = Scheduler::new(&self.rates, Instant::now());
        let mut keys = *self.chip8.cpu.keys();
        loop {
            if let Signal::Stop = platform.poll(&mut keys)? {
                return Ok(match self.state() {
                    State::AwaitingKey => Exit::Cancelled,
                    _ => Exit::Stopped,
                });
            }
            self.chip8.cpu.set_keys(keys);

            let due = scheduler.poll(Instant::now());
            for _ in 0..due.instructions {
                if let State::AwaitingKey = self.step()? {
                    break;
                }
            }
            for _ in 0..due.timer_ticks {
                self.tick_timers();
            }
            if due.render {
                platform.render(&self.chip8.screen, self.chip8.cpu.sound_active())?;
            }

            let suspended = self.state() == State::AwaitingKey;
            let idle = scheduler.idle_for(Instant::now(), suspended);
            if !idle.is_zero() {
                std::thread::sleep(idle);
            }
        }
    }
}
