use std::ops::Add;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;

use crate::decode::{ADD, ADJUST_BASE, EQUALS, HALT, JUMP_IF_FALSE, JUMP_IF_TRUE, LESS_THAN, MUL, READ, WRITE};
use crate::error::Error;
use crate::machine::{Machine, State};

const OPCODES: [i64; 10] = [ADD, MUL, READ, WRITE, JUMP_IF_TRUE, JUMP_IF_FALSE, LESS_THAN, EQUALS, ADJUST_BASE, HALT];

/// Configuration for a random-program stress run.
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    /// Number of programs to generate and run.
    pub programs: usize,
    /// Cells per program.
    pub program_size: usize,
    /// Maximum instructions per program.
    pub step_limit: usize,
    /// Probability that a cell is an instruction header rather than an operand.
    pub header_rate: f64,
    pub seed: u64,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            programs: 1 << 12,
            program_size: 64,
            step_limit: 1 << 13,
            header_rate: 0.4,
            seed: 0,
        }
    }
}

/// How each program in a fuzz run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuzzReport {
    pub halted: usize,
    /// Still running when the step budget ran out.
    pub exhausted: usize,
    pub unknown_opcode: usize,
    pub invalid_address: usize,
    pub invalid_mode: usize,
    pub invalid_write_mode: usize,
    pub overflow: usize,
    /// Any other error. A fresh machine driven by `run_one` never raises one.
    pub other: usize,
    /// Instructions executed across all programs. A read that had to wait
    /// for input counts once, when it completes.
    pub steps: u64,
    /// Values written across all programs.
    pub outputs: u64,
}

impl FuzzReport {
    pub fn total(&self) -> usize {
        self.halted
            + self.exhausted
            + self.unknown_opcode
            + self.invalid_address
            + self.invalid_mode
            + self.invalid_write_mode
            + self.overflow
            + self.other
    }

    pub fn faulted(&self) -> usize {
        self.total() - self.halted - self.exhausted
    }
}

impl Add for FuzzReport {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            halted: self.halted + other.halted,
            exhausted: self.exhausted + other.exhausted,
            unknown_opcode: self.unknown_opcode + other.unknown_opcode,
            invalid_address: self.invalid_address + other.invalid_address,
            invalid_mode: self.invalid_mode + other.invalid_mode,
            invalid_write_mode: self.invalid_write_mode + other.invalid_write_mode,
            overflow: self.overflow + other.overflow,
            other: self.other + other.other,
            steps: self.steps + other.steps,
            outputs: self.outputs + other.outputs,
        }
    }
}

/// Generate a random program. Header cells use a real opcode with random
/// modes, one digit in sixteen outside the valid range; operand cells are
/// small values that mostly point back into the program.
pub fn random_program(rng: &mut SmallRng, size: usize, header_rate: f64) -> Vec<i64> {
    let span = size.max(1) as i64;
    let header_rate = header_rate.clamp(0.0, 1.0);
    (0..size)
        .map(|_| {
            if rng.gen_bool(header_rate) {
                let opcode = OPCODES[rng.gen_range(0..OPCODES.len())];
                let modes: i64 = (0..3)
                    .map(|k| {
                        let digit = if rng.gen_ratio(1, 16) {
                            rng.gen_range(3..10)
                        } else {
                            rng.gen_range(0..3)
                        };
                        digit * 10i64.pow(k + 2)
                    })
                    .sum();
                opcode + modes
            } else {
                rng.gen_range(-8..span * 2)
            }
        })
        .collect()
}

/// Run one program for at most `step_limit` instructions, answering every
/// read with the number of reads served so far.
pub fn run_one(image: Vec<i64>, step_limit: usize) -> FuzzReport {
    let mut machine = Machine::new(image);
    let mut report = FuzzReport::default();
    let mut reads = 0i64;
    while report.steps < step_limit as u64 {
        match machine.step() {
            Ok(State::Running) => report.steps += 1,
            // The read did not execute; feed it and retry.
            Ok(State::AwaitingInput) => {
                machine.push_input(reads);
                reads += 1;
            }
            Ok(State::Halted) => {
                report.steps += 1;
                report.halted = 1;
                break;
            }
            Err(e) => {
                match e {
                    Error::UnknownOpcode { .. } => report.unknown_opcode = 1,
                    Error::InvalidAddress(_) => report.invalid_address = 1,
                    Error::InvalidMode { .. } => report.invalid_mode = 1,
                    Error::InvalidWriteMode(_) => report.invalid_write_mode = 1,
                    Error::Overflow(_) => report.overflow = 1,
                    Error::Faulted(_) | Error::Parse { .. } | Error::Io(_) | Error::Protocol(_) => {
                        report.other = 1
                    }
                }
                break;
            }
        }
    }
    if report.total() == 0 {
        report.exhausted = 1;
    }
    report.outputs = machine.output().len() as u64;
    report
}

/// Generate `config.programs` random programs from the seed and run them all
/// in parallel.
///
/// Generation is sequential from a single seeded RNG, so a given config always
/// produces the same report.
pub fn fuzz(config: &FuzzConfig) -> FuzzReport {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let programs: Vec<Vec<i64>> = (0..config.programs)
        .map(|_| random_program(&mut rng, config.program_size, config.header_rate))
        .collect();
    let step_limit = config.step_limit;
    programs
        .into_par_iter()
        .map(|image| run_one(image, step_limit))
        .reduce(FuzzReport::default, |a, b| a + b)
}
