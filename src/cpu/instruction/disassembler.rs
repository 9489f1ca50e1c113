// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! A disassembler for Chip-8 opcodes
use super::Insn;
use owo_colors::{OwoColorize, Style};

/// Disassembles Chip-8 instructions
pub trait Disassembler {
    /// Disassemble a single instruction
    fn once(&self, insn: u16) -> String;
}

/// Disassembles Chip-8 instructions, printing them in the provided [owo_colors::Style]s
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dis {
    /// Styles invalid instructions
    pub invalid: Style,
    /// Styles valid instruction
    pub normal: Style,
}

impl Dis {
    /// A disassembler that emits no escape codes, for log files and tests
    pub fn plain() -> Self {
        Self {
            invalid: Style::new(),
            normal: Style::new(),
        }
    }
}

impl Default for Dis {
    fn default() -> Self {
        Self {
            invalid: Style::new().bold().red(),
            normal: Style::new().green(),
        }
    }
}

impl Disassembler for Dis {
    fn once(&self, insn: u16) -> String {
        match Insn::decode(insn) {
            insn @ Insn::unknown { .. } => format!("{}", insn.style(self.invalid)),
            insn => format!("{}", insn.style(self.normal)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text() {
        let dis = Dis::plain();
        assert!(dis.once(0x00e0).contains("cls"));
        assert!(dis.once(0x1234).contains("jmp    234"));
        assert!(dis.once(0xd125).contains("draw   #5, v1, v2"));
        assert!(dis.once(0xffff).contains("inval  ffff"));
    }

    #[test]
    fn styled_text_keeps_mnemonic() {
        let dis = Dis::default();
        assert!(dis.once(0x00ee).contains("ret"));
        assert!(dis.once(0x5ab1).contains("inval  5ab1"));
    }
}
