use std::fmt::Write;

use crate::decode::{Instruction, Mode};
use crate::operand::Param;
use crate::tape::Tape;

/// Render an operand: `[a]` position, `a` immediate, `[rb+a]` relative.
fn operand(p: &Param) -> String {
    match p.mode {
        Mode::Position => format!("[{}]", p.raw),
        Mode::Immediate => p.raw.to_string(),
        Mode::Relative if p.raw < 0 => format!("[rb{}]", p.raw),
        Mode::Relative => format!("[rb+{}]", p.raw),
    }
}

/// Pretty-print a disassembly of the given tape for human inspection.
///
/// Code and data share the tape, so this is a linear sweep: any cell that
/// does not decode to a known instruction is shown as data and the sweep
/// moves on by one cell.
pub fn disassemble(tape: &[i64]) -> String {
    let image = Tape::from(tape);
    let mut out = String::new();
    let mut addr = 0usize;
    while addr < tape.len() {
        match Instruction::fetch(&image, addr as i64) {
            Ok(instr) => {
                let len = instr.len() as usize;
                let raw: Vec<String> = (addr..(addr + len).min(tape.len()))
                    .map(|i| tape[i].to_string())
                    .collect();
                let args: Vec<String> = instr.params().iter().map(operand).collect();
                let _ = writeln!(
                    out,
                    "{addr:04}: {:<28} {} {}",
                    raw.join(" "),
                    instr.mnemonic(),
                    args.join(", ")
                );
                addr += len;
            }
            Err(_) => {
                let _ = writeln!(out, "{addr:04}: {:<28} (data)", tape[addr]);
                addr += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_simple() {
        let text = disassemble(&[1002, 4, 3, 4, 33]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000: 1002 4 3 4"));
        assert!(lines[0].ends_with("mul [4], 3, [4]"));
        assert!(lines[1].starts_with("0004: 33"));
        assert!(lines[1].ends_with("(data)"));
    }

    #[test]
    fn test_disassemble_relative() {
        let text = disassemble(&[109, 1, 204, -1, 99]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("arb 1"));
        assert!(lines[1].ends_with("out [rb-1]"));
        assert!(lines[2].trim_end().ends_with("halt"));
    }

    #[test]
    fn test_disassemble_truncated_instruction() {
        // The add runs off the end of the tape; only present cells are shown.
        let text = disassemble(&[1, 0]);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("0000: 1 0 "));
    }

    #[test]
    fn test_disassemble_empty() {
        assert_eq!(disassemble(&[]), "");
    }
}
