//! 8-bit countdown timers

/// What a call to [Timer::decrement] did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    /// Still counting
    On,
    /// Was already zero; nothing happened
    Off,
    /// Reached zero on this tick
    Finished,
}

/// A countdown timer, decremented at 60Hz by the owner of the [super::CPU]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer(u8);

impl Timer {
    #[inline]
    pub fn store(&mut self, value: u8) {
        self.0 = value;
    }

    #[inline]
    pub fn load(&self) -> u8 {
        self.0
    }

    /// Counts down by one, stopping at zero
    #[inline]
    pub fn decrement(&mut self) -> TimerState {
        match self.0 {
            0 => TimerState::Off,
            1 => {
                self.0 = 0;
                TimerState::Finished
            }
            _ => {
                self.0 -= 1;
                TimerState::On
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_zero() {
        let mut timer = Timer::default();
        timer.store(3);
        assert_eq!(TimerState::On, timer.decrement());
        assert_eq!(TimerState::On, timer.decrement());
        assert_eq!(TimerState::Finished, timer.decrement());
        assert_eq!(0, timer.load());
        // never goes negative
        assert_eq!(TimerState::Off, timer.decrement());
        assert_eq!(0, timer.load());
    }
}
