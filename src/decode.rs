use crate::error::{Error, Result};
use crate::operand::Param;
use crate::tape::Tape;

pub const ADD: i64 = 1;
pub const MUL: i64 = 2;
pub const READ: i64 = 3;
pub const WRITE: i64 = 4;
pub const JUMP_IF_TRUE: i64 = 5;
pub const JUMP_IF_FALSE: i64 = 6;
pub const LESS_THAN: i64 = 7;
pub const EQUALS: i64 = 8;
pub const ADJUST_BASE: i64 = 9;
pub const HALT: i64 = 99;

/// The raw fields of one instruction cell: the low two decimal digits are the
/// opcode, the next three digits are the modes of operands 1, 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub opcode: i64,
    pub modes: [i64; 3],
}

/// Split a cell into opcode and mode digits. Never fails; validation happens
/// when the header is turned into an [`Instruction`].
pub fn decode(cell: i64) -> Header {
    let digit = |place: i64| cell.div_euclid(place).rem_euclid(10);
    Header {
        opcode: cell.rem_euclid(100),
        modes: [digit(100), digit(1_000), digit(10_000)],
    }
}

/// Addressing mode of a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The operand is an address.
    Position,
    /// The operand is the value itself.
    Immediate,
    /// The operand is an offset from the relative base.
    Relative,
}

impl Mode {
    /// `address` is the instruction's own address, for error reporting.
    pub fn from_digit(digit: i64, address: i64) -> Result<Self> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            mode => Err(Error::InvalidMode { mode, address }),
        }
    }

    pub fn digit(self) -> i64 {
        match self {
            Mode::Position => 0,
            Mode::Immediate => 1,
            Mode::Relative => 2,
        }
    }
}

/// One decoded instruction. Operands are listed in tape order; the last
/// operand of add, mul, read, less-than and equals is the write target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Add(Param, Param, Param),
    Mul(Param, Param, Param),
    Read(Param),
    Write(Param),
    JumpIfTrue(Param, Param),
    JumpIfFalse(Param, Param),
    LessThan(Param, Param, Param),
    Equals(Param, Param, Param),
    AdjustBase(Param),
    Halt,
}

impl Instruction {
    /// Decode the instruction starting at `ip`.
    pub fn fetch(tape: &Tape, ip: i64) -> Result<Self> {
        let header = decode(tape.get(ip)?);
        let param = |k: usize| -> Result<Param> {
            let at = ip
                .checked_add(k as i64 + 1)
                .ok_or(Error::Overflow(ip))?;
            Ok(Param {
                mode: Mode::from_digit(header.modes[k], ip)?,
                raw: tape.get(at)?,
                at,
            })
        };

        let instr = match header.opcode {
            ADD => Instruction::Add(param(0)?, param(1)?, param(2)?),
            MUL => Instruction::Mul(param(0)?, param(1)?, param(2)?),
            READ => Instruction::Read(param(0)?),
            WRITE => Instruction::Write(param(0)?),
            JUMP_IF_TRUE => Instruction::JumpIfTrue(param(0)?, param(1)?),
            JUMP_IF_FALSE => Instruction::JumpIfFalse(param(0)?, param(1)?),
            LESS_THAN => Instruction::LessThan(param(0)?, param(1)?, param(2)?),
            EQUALS => Instruction::Equals(param(0)?, param(1)?, param(2)?),
            ADJUST_BASE => Instruction::AdjustBase(param(0)?),
            HALT => Instruction::Halt,
            opcode => return Err(Error::UnknownOpcode { opcode, address: ip }),
        };
        Ok(instr)
    }

    /// Number of tape cells the instruction occupies.
    pub fn len(&self) -> i64 {
        match self {
            Instruction::Add(..)
            | Instruction::Mul(..)
            | Instruction::LessThan(..)
            | Instruction::Equals(..) => 4,
            Instruction::JumpIfTrue(..) | Instruction::JumpIfFalse(..) => 3,
            Instruction::Read(_) | Instruction::Write(_) | Instruction::AdjustBase(_) => 2,
            Instruction::Halt => 1,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Add(..) => "add",
            Instruction::Mul(..) => "mul",
            Instruction::Read(_) => "in",
            Instruction::Write(_) => "out",
            Instruction::JumpIfTrue(..) => "jnz",
            Instruction::JumpIfFalse(..) => "jz",
            Instruction::LessThan(..) => "lt",
            Instruction::Equals(..) => "eq",
            Instruction::AdjustBase(_) => "arb",
            Instruction::Halt => "halt",
        }
    }

    pub fn params(&self) -> Vec<Param> {
        match *self {
            Instruction::Add(a, b, c)
            | Instruction::Mul(a, b, c)
            | Instruction::LessThan(a, b, c)
            | Instruction::Equals(a, b, c) => vec![a, b, c],
            Instruction::JumpIfTrue(a, b) | Instruction::JumpIfFalse(a, b) => vec![a, b],
            Instruction::Read(a) | Instruction::Write(a) | Instruction::AdjustBase(a) => vec![a],
            Instruction::Halt => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_opcode() {
        assert_eq!(decode(1), Header { opcode: 1, modes: [0, 0, 0] });
        assert_eq!(decode(99), Header { opcode: 99, modes: [0, 0, 0] });
    }

    #[test]
    fn test_decode_modes() {
        assert_eq!(decode(1002), Header { opcode: 2, modes: [0, 1, 0] });
        assert_eq!(decode(21101), Header { opcode: 1, modes: [1, 1, 2] });
        assert_eq!(decode(204), Header { opcode: 4, modes: [2, 0, 0] });
    }

    #[test]
    fn test_decode_ignores_higher_digits() {
        // Digits above the third mode do not leak into anything.
        assert_eq!(decode(1_000_099), Header { opcode: 99, modes: [0, 0, 0] });
    }

    #[test]
    fn test_decode_unknown_opcode_is_not_rejected() {
        assert_eq!(decode(42), Header { opcode: 42, modes: [0, 0, 0] });
    }

    #[test]
    fn test_mode_from_digit() {
        assert_eq!(Mode::from_digit(0, 0).unwrap(), Mode::Position);
        assert_eq!(Mode::from_digit(1, 0).unwrap(), Mode::Immediate);
        assert_eq!(Mode::from_digit(2, 0).unwrap(), Mode::Relative);
        assert!(matches!(
            Mode::from_digit(3, 12),
            Err(Error::InvalidMode { mode: 3, address: 12 })
        ));
    }

    #[test]
    fn test_fetch_add() {
        let tape = Tape::new(vec![1001, 5, -3, 6, 99]);
        let instr = Instruction::fetch(&tape, 0).unwrap();
        let Instruction::Add(a, b, out) = instr else {
            panic!("expected add, got {instr:?}");
        };
        assert_eq!((a.mode, a.raw, a.at), (Mode::Position, 5, 1));
        assert_eq!((b.mode, b.raw, b.at), (Mode::Immediate, -3, 2));
        assert_eq!((out.mode, out.raw, out.at), (Mode::Position, 6, 3));
        assert_eq!(instr.len(), 4);
    }

    #[test]
    fn test_fetch_operands_past_end_read_zero() {
        // A truncated instruction reads missing operands as 0.
        let tape = Tape::new(vec![4]);
        let instr = Instruction::fetch(&tape, 0).unwrap();
        assert_eq!(instr, Instruction::Write(Param { mode: Mode::Position, raw: 0, at: 1 }));
    }

    #[test]
    fn test_fetch_unknown_opcode() {
        let tape = Tape::new(vec![1, 0, 0, 0, 42]);
        assert!(matches!(
            Instruction::fetch(&tape, 4),
            Err(Error::UnknownOpcode { opcode: 42, address: 4 })
        ));
    }

    #[test]
    fn test_fetch_bad_mode() {
        let tape = Tape::new(vec![304, 0]);
        assert!(matches!(
            Instruction::fetch(&tape, 0),
            Err(Error::InvalidMode { mode: 3, address: 0 })
        ));
    }

    #[test]
    fn test_lengths() {
        let lens: Vec<i64> = [
            vec![1, 0, 0, 0],
            vec![2, 0, 0, 0],
            vec![3, 0],
            vec![4, 0],
            vec![5, 0, 0],
            vec![6, 0, 0],
            vec![7, 0, 0, 0],
            vec![8, 0, 0, 0],
            vec![9, 0],
            vec![99],
        ]
        .into_iter()
        .map(|cells| Instruction::fetch(&Tape::new(cells), 0).unwrap().len())
        .collect();
        assert_eq!(lens, vec![4, 4, 2, 2, 3, 3, 4, 4, 2, 1]);
    }
}
