// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE.txt for details)

//! A [Platform] that draws to, and reads keys from, the terminal

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use fantasy8::{error::Result, Platform, Screen, Signal};
use log::warn;
use std::{
    io::{stdout, Stdout, Write},
    time::{Duration, Instant},
};

/// Maps the left side of a qwerty keyboard onto the 4x4 keypad
///
/// |keyboard|keypad  |
/// |--------|--------|
/// |`1234`  |`123C`  |
/// |`QWER`  |`456D`  |
/// |`ASDF`  |`789E`  |
/// |`ZXCV`  |`A0BF`  |
#[rustfmt::skip]
pub const KEYMAP: [(char, usize); 16] = [
    ('1', 0x1), ('2', 0x2), ('3', 0x3), ('4', 0xc),
    ('q', 0x4), ('w', 0x5), ('e', 0x6), ('r', 0xd),
    ('a', 0x7), ('s', 0x8), ('d', 0x9), ('f', 0xe),
    ('z', 0xa), ('x', 0x0), ('c', 0xb), ('v', 0xf),
];

/// Looks a keyboard character up in the [KEYMAP]
pub fn keypad(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    KEYMAP.iter().find(|(k, _)| *k == c).map(|&(_, key)| key)
}

/// Renders one row of the screen, two characters per pixel
pub fn row_text(row: &[bool]) -> String {
    row.iter().map(|&lit| if lit { "██" } else { "  " }).collect()
}

/// Owns the terminal for as long as it lives
///
/// Terminals don't report key releases, so each key counts as held for
/// `hold` after its last press or repeat.
pub struct Term {
    out: Stdout,
    held: [Option<Instant>; 16],
    hold: Duration,
}

impl Term {
    /// Switches the terminal into raw mode on the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Term {
            out,
            held: [None; 16],
            hold: Duration::from_millis(150),
        })
    }

    fn key_event(&mut self, event: KeyEvent) -> Signal {
        match (event.code, event.modifiers) {
            (KeyCode::Esc, _) => return Signal::Stop,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Signal::Stop,
            (KeyCode::Char(c), _) => match keypad(c) {
                Some(key) => {
                    self.held[key] = match event.kind {
                        KeyEventKind::Release => None,
                        _ => Some(Instant::now()),
                    }
                }
                None => warn!("{c:?} is not on the keypad"),
            },
            _ => {}
        }
        Signal::Continue
    }
}

impl Platform for Term {
    fn render(&mut self, screen: &Screen, sound: bool) -> Result<()> {
        for (y, row) in screen.rows().enumerate() {
            queue!(self.out, MoveTo(0, y as u16), Print(row_text(row)))?;
        }
        let status = if sound { "♪" } else { " " };
        queue!(self.out, MoveTo(0, screen.rows().count() as u16), Print(status))?;
        self.out.flush()?;
        Ok(())
    }

    fn poll(&mut self, keys: &mut [bool; 16]) -> Result<Signal> {
        while poll(Duration::ZERO)? {
            if let Event::Key(event) = read()? {
                if let Signal::Stop = self.key_event(event) {
                    return Ok(Signal::Stop);
                }
            }
        }
        let (now, hold) = (Instant::now(), self.hold);
        for (key, held) in keys.iter_mut().zip(self.held.iter_mut()) {
            if held.map_or(false, |at| now.duration_since(at) > hold) {
                *held = None;
            }
            *key = held.is_some();
        }
        Ok(Signal::Continue)
    }
}

impl Drop for Term {
    fn drop(&mut self) {
        // Errors here leave nothing further to restore
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl std::fmt::Debug for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Term")
            .field("held", &self.held)
            .field("hold", &self.hold)
            .finish_non_exhaustive()
    }
}
