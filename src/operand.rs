use crate::decode::Mode;
use crate::error::{Error, Result};
use crate::tape::Tape;

/// A single instruction operand as it sits on the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub mode: Mode,
    /// Contents of the operand cell.
    pub raw: i64,
    /// Address of the operand cell itself.
    pub at: i64,
}

impl Param {
    /// Effective address of the operand.
    ///
    /// Immediate operands resolve to their own cell, so reading through the
    /// address yields the literal.
    pub fn address(&self, relative_base: i64) -> Result<i64> {
        match self.mode {
            Mode::Position => Ok(self.raw),
            Mode::Immediate => Ok(self.at),
            Mode::Relative => relative_base
                .checked_add(self.raw)
                .ok_or(Error::Overflow(self.at)),
        }
    }

    /// Value of the operand.
    pub fn read(&self, tape: &Tape, relative_base: i64) -> Result<i64> {
        match self.mode {
            Mode::Immediate => Ok(self.raw),
            Mode::Position | Mode::Relative => tape.get(self.address(relative_base)?),
        }
    }

    /// Address a result is stored to.
    pub fn target(&self, relative_base: i64) -> Result<i64> {
        match self.mode {
            Mode::Immediate => Err(Error::InvalidWriteMode(self.at)),
            Mode::Position | Mode::Relative => self.address(relative_base),
        }
    }
}
