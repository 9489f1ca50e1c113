// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The outside world, as the [Emulator](crate::Emulator) sees it
//!
//! A [Platform] draws frames, reports which keys are held, and says when to stop.
//! [Headless] is a scripted platform for tests and batch runs.

use crate::{error::Result, screen::Screen};

/// What the platform wants the run loop to do next
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Keep running
    #[default]
    Continue,
    /// Leave the run loop, even if the machine is waiting for a key
    Stop,
}

/// Trait aggregating the functionality of the host the machine runs on
pub trait Platform {
    /// Draws the current frame.
    ///
    /// Called by the run loop at the render rate. `sound` is true while the
    /// sound timer is counting.
    fn render(&mut self, screen: &Screen, sound: bool) -> Result<()>;
    /// Updates `keys` with the state of each key on the 4x4 keypad
    ///
    /// Called by the run loop once per iteration, before any instructions run.
    fn poll(&mut self, keys: &mut [bool; 16]) -> Result<Signal>;
}

/// A [Platform] with no window and no keyboard
///
/// Keys are pressed and released on a schedule counted in polls, and the
/// run loop can be told to stop after a fixed number of polls.
///
/// # Examples
/// ```rust
/// # use fantasy8::*;
/// let mut host = Headless::new().press_at(2, 0x5).stop_after(3);
/// let mut keys = [false; 16];
/// assert_eq!(Signal::Continue, host.poll(&mut keys).unwrap());
/// assert_eq!(Signal::Continue, host.poll(&mut keys).unwrap());
/// assert_eq!(Signal::Continue, host.poll(&mut keys).unwrap());
/// assert!(keys[0x5]);
/// assert_eq!(Signal::Stop, host.poll(&mut keys).unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Headless {
    polls: usize,
    stop_after: Option<usize>,
    script: Vec<(usize, usize, bool)>,
    frames: usize,
    last_frame: Option<Screen>,
    sound: bool,
}

impl Headless {
    /// Constructs a platform that never presses a key and never stops
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals [Signal::Stop] on poll number `polls` (counting from zero)
    pub fn stop_after(mut self, polls: usize) -> Self {
        self.stop_after = Some(polls);
        self
    }

    /// Holds down `key` from poll number `poll` onward
    pub fn press_at(mut self, poll: usize, key: usize) -> Self {
        self.script.push((poll, key & 0xf, true));
        self
    }

    /// Lets go of `key` from poll number `poll` onward
    pub fn release_at(mut self, poll: usize, key: usize) -> Self {
        self.script.push((poll, key & 0xf, false));
        self
    }

    /// The number of times the keys have been polled
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// The number of frames rendered
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// The most recently rendered frame, if any
    pub fn last_frame(&self) -> Option<&Screen> {
        self.last_frame.as_ref()
    }

    /// Whether the last rendered frame had the tone on
    pub fn sound(&self) -> bool {
        self.sound
    }
}

impl Platform for Headless {
    fn render(&mut self, screen: &Screen, sound: bool) -> Result<()> {
        self.frames += 1;
        self.sound = sound;
        match &mut self.last_frame {
            Some(frame) => frame.clone_from(screen),
            None => self.last_frame = Some(screen.clone()),
        }
        Ok(())
    }

    fn poll(&mut self, keys: &mut [bool; 16]) -> Result<Signal> {
        let poll = self.polls;
        self.polls += 1;
        for &(_, key, held) in self.script.iter().filter(|(at, ..)| *at == poll) {
            keys[key] = held;
        }
        Ok(match self.stop_after {
            Some(stop) if poll >= stop => Signal::Stop,
            _ => Signal::Continue,
        })
    }
}
