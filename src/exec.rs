use crate::decode::Instruction;
use crate::error::{Error, Result};
use crate::machine::Machine;

/// What the controller should do with the instruction pointer after an
/// instruction has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Advance by the instruction's length.
    Next,
    /// Set the instruction pointer directly.
    Jump(i64),
    /// Read with an empty input queue. Nothing was consumed.
    Block,
    Halt,
}

/// Apply one decoded instruction to the machine's tape, registers and queues.
pub(crate) fn execute(m: &mut Machine, instr: Instruction) -> Result<Flow> {
    let rb = m.relative_base;
    let ip = m.ip;
    match instr {
        Instruction::Add(a, b, out) => {
            let sum = a
                .read(&m.tape, rb)?
                .checked_add(b.read(&m.tape, rb)?)
                .ok_or(Error::Overflow(ip))?;
            m.tape.set(out.target(rb)?, sum)?;
        }
        Instruction::Mul(a, b, out) => {
            let product = a
                .read(&m.tape, rb)?
                .checked_mul(b.read(&m.tape, rb)?)
                .ok_or(Error::Overflow(ip))?;
            m.tape.set(out.target(rb)?, product)?;
        }
        Instruction::Read(out) => {
            let addr = out.target(rb)?;
            let Some(value) = m.input.pop_front() else {
                return Ok(Flow::Block);
            };
            m.tape.set(addr, value)?;
        }
        Instruction::Write(a) => {
            let value = a.read(&m.tape, rb)?;
            m.output.push(value);
        }
        Instruction::JumpIfTrue(a, target) => {
            if a.read(&m.tape, rb)? != 0 {
                return Ok(Flow::Jump(target.read(&m.tape, rb)?));
            }
        }
        Instruction::JumpIfFalse(a, target) => {
            if a.read(&m.tape, rb)? == 0 {
                return Ok(Flow::Jump(target.read(&m.tape, rb)?));
            }
        }
        Instruction::LessThan(a, b, out) => {
            let flag = a.read(&m.tape, rb)? < b.read(&m.tape, rb)?;
            m.tape.set(out.target(rb)?, flag as i64)?;
        }
        Instruction::Equals(a, b, out) => {
            let flag = a.read(&m.tape, rb)? == b.read(&m.tape, rb)?;
            m.tape.set(out.target(rb)?, flag as i64)?;
        }
        Instruction::AdjustBase(a) => {
            m.relative_base = rb
                .checked_add(a.read(&m.tape, rb)?)
                .ok_or(Error::Overflow(ip))?;
        }
        Instruction::Halt => return Ok(Flow::Halt),
    }
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Mode;
    use crate::operand::Param;

    fn pos(raw: i64) -> Param {
        Param { mode: Mode::Position, raw, at: 0 }
    }

    fn imm(raw: i64) -> Param {
        Param { mode: Mode::Immediate, raw, at: 0 }
    }

    fn rel(raw: i64) -> Param {
        Param { mode: Mode::Relative, raw, at: 0 }
    }

    #[test]
    fn test_add_and_mul() {
        let mut m = Machine::new(vec![0, 0, 0, 0, 6, 7]);
        assert_eq!(execute(&mut m, Instruction::Add(pos(4), pos(5), pos(0))).unwrap(), Flow::Next);
        assert_eq!(m.tape().get(0).unwrap(), 13);
        execute(&mut m, Instruction::Mul(pos(4), imm(-3), pos(1))).unwrap();
        assert_eq!(m.tape().get(1).unwrap(), -18);
    }

    #[test]
    fn test_overflow_is_fatal() {
        let mut m = Machine::new(vec![0]);
        let err = execute(&mut m, Instruction::Mul(imm(i64::MAX), imm(2), pos(0))).unwrap_err();
        assert!(matches!(err, Error::Overflow(0)));
        let err = execute(&mut m, Instruction::Add(imm(i64::MAX), imm(1), pos(0))).unwrap_err();
        assert!(matches!(err, Error::Overflow(0)));
    }

    #[test]
    fn test_read_blocks_without_consuming() {
        let mut m = Machine::new(vec![5]);
        assert_eq!(execute(&mut m, Instruction::Read(pos(0))).unwrap(), Flow::Block);
        assert_eq!(m.tape().get(0).unwrap(), 5);
        m.push_input(9);
        assert_eq!(execute(&mut m, Instruction::Read(pos(0))).unwrap(), Flow::Next);
        assert_eq!(m.tape().get(0).unwrap(), 9);
        assert_eq!(m.pending_input(), 0);
    }

    #[test]
    fn test_read_rejects_immediate_target() {
        let mut m = Machine::new(vec![0]);
        m.push_input(1);
        assert!(matches!(
            execute(&mut m, Instruction::Read(imm(0))),
            Err(Error::InvalidWriteMode(0))
        ));
    }

    #[test]
    fn test_write_appends() {
        let mut m = Machine::new(vec![11, 22]);
        execute(&mut m, Instruction::Write(pos(1))).unwrap();
        execute(&mut m, Instruction::Write(imm(-4))).unwrap();
        assert_eq!(m.output(), &[22, -4]);
    }

    #[test]
    fn test_jumps() {
        let mut m = Machine::new(vec![0]);
        assert_eq!(execute(&mut m, Instruction::JumpIfTrue(imm(-1), imm(7))).unwrap(), Flow::Jump(7));
        assert_eq!(execute(&mut m, Instruction::JumpIfTrue(imm(0), imm(7))).unwrap(), Flow::Next);
        assert_eq!(execute(&mut m, Instruction::JumpIfFalse(imm(0), imm(3))).unwrap(), Flow::Jump(3));
        assert_eq!(execute(&mut m, Instruction::JumpIfFalse(imm(2), imm(3))).unwrap(), Flow::Next);
    }

    #[test]
    fn test_comparisons() {
        let mut m = Machine::new(vec![0, 0]);
        execute(&mut m, Instruction::LessThan(imm(1), imm(2), pos(0))).unwrap();
        execute(&mut m, Instruction::LessThan(imm(2), imm(2), pos(1))).unwrap();
        assert_eq!(m.tape().as_slice(), &[1, 0]);
        execute(&mut m, Instruction::Equals(imm(2), imm(2), pos(0))).unwrap();
        execute(&mut m, Instruction::Equals(imm(2), imm(3), pos(1))).unwrap();
        assert_eq!(m.tape().as_slice(), &[1, 0]);
    }

    #[test]
    fn test_adjust_base_and_relative_write() {
        let mut m = Machine::new(vec![0; 4]);
        execute(&mut m, Instruction::AdjustBase(imm(10))).unwrap();
        execute(&mut m, Instruction::AdjustBase(imm(-8))).unwrap();
        assert_eq!(m.relative_base(), 2);
        execute(&mut m, Instruction::Add(imm(1), imm(1), rel(1))).unwrap();
        assert_eq!(m.tape().as_slice(), &[0, 0, 0, 2]);
    }

    #[test]
    fn test_halt() {
        let mut m = Machine::new(vec![99]);
        assert_eq!(execute(&mut m, Instruction::Halt).unwrap(), Flow::Halt);
    }
}
