//! The call stack: sixteen return addresses, no more

use super::Adr;
use heapless::Vec;

/// Number of return addresses the stack can hold
pub const STACK_DEPTH: usize = 16;

/// Fixed-capacity stack of return addresses
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    slots: Vec<Adr, STACK_DEPTH>,
}

impl Stack {
    /// Pushes a return address.
    ///
    /// When all slots are in use the address is handed back in `Err`
    /// and the stack is unchanged.
    #[inline]
    pub fn push(&mut self, adr: Adr) -> Result<(), Adr> {
        self.slots.push(adr)
    }

    /// Pops the most recent return address, if any
    #[inline]
    pub fn pop(&mut self) -> Option<Adr> {
        self.slots.pop()
    }

    /// The stack pointer: number of addresses currently held
    pub fn sp(&self) -> usize {
        self.slots.len()
    }

    /// Empties the stack
    pub fn clear(&mut self) {
        self.slots.clear()
    }

    /// The held addresses, oldest first
    pub fn as_slice(&self) -> &[Adr] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_deep() {
        let mut stack = Stack::default();
        for adr in 0..STACK_DEPTH as Adr {
            stack.push(0x200 + 2 * adr).unwrap();
        }
        assert_eq!(STACK_DEPTH, stack.sp());
        // the seventeenth is rejected, and handed back
        assert_eq!(Err(0x400), stack.push(0x400));
        assert_eq!(STACK_DEPTH, stack.sp());
        assert_eq!(Some(0x21e), stack.pop());
    }

    #[test]
    fn pop_empty() {
        let mut stack = Stack::default();
        assert_eq!(None, stack.pop());
        assert_eq!(0, stack.sp());
        stack.push(0x123).unwrap();
        stack.clear();
        assert_eq!(None, stack.pop());
    }
}
