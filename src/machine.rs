use std::collections::VecDeque;

use log::{debug, trace};

use crate::decode::Instruction;
use crate::error::{Error, Result};
use crate::exec::{self, Flow};
use crate::tape::Tape;

/// Execution state of a [`Machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Running,
    /// Blocked on a read with an empty input queue. The read is retried on
    /// the next `resume`.
    AwaitingInput,
    /// Terminal. Reached only through opcode 99.
    Halted,
}

/// An Intcode machine: tape, registers, I/O queues and state as one owned value.
///
/// Machines are driven with [`run`](Machine::run) / [`resume`](Machine::resume),
/// each of which appends to the input queue and executes until the program
/// halts or blocks on input. Cloning produces a fully independent machine,
/// which is how callers explore several continuations of the same state.
///
/// A fatal error stops the machine for good: later calls report
/// [`Error::Faulted`] without executing anything.
#[derive(Debug, Clone)]
pub struct Machine {
    pub(crate) tape: Tape,
    pub(crate) ip: i64,
    pub(crate) relative_base: i64,
    pub(crate) input: VecDeque<i64>,
    pub(crate) output: Vec<i64>,
    state: State,
    fault: Option<String>,
}

impl Machine {
    pub fn new(image: impl Into<Tape>) -> Self {
        Self {
            tape: image.into(),
            ip: 0,
            relative_base: 0,
            input: VecDeque::new(),
            output: Vec::new(),
            state: State::Running,
            fault: None,
        }
    }

    /// Start with a non-zero relative base.
    pub fn with_relative_base(mut self, relative_base: i64) -> Self {
        self.relative_base = relative_base;
        self
    }

    /// Append `inputs` and execute until the machine halts or needs more input.
    ///
    /// On a halted machine this is a no-op and the inputs are dropped.
    pub fn run(&mut self, inputs: impl IntoIterator<Item = i64>) -> Result<State> {
        self.check_fault()?;
        if self.state == State::Halted {
            return Ok(State::Halted);
        }
        self.input.extend(inputs);
        self.state = State::Running;
        while self.state == State::Running {
            self.cycle()?;
        }
        Ok(self.state)
    }

    /// Continue a paused machine with more input. Same contract as [`run`](Machine::run).
    pub fn resume(&mut self, inputs: impl IntoIterator<Item = i64>) -> Result<State> {
        self.run(inputs)
    }

    /// Execute a single instruction.
    ///
    /// The machine has no step budget of its own; callers that need to bound
    /// execution drive it through this method.
    pub fn step(&mut self) -> Result<State> {
        self.check_fault()?;
        if self.state == State::Halted {
            return Ok(State::Halted);
        }
        self.state = State::Running;
        self.cycle()?;
        Ok(self.state)
    }

    /// An independent copy of the machine as it is right now.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != State::Halted
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn ip(&self) -> i64 {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn push_input(&mut self, value: i64) {
        self.input.push_back(value);
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Everything written since the output was last drained or cleared.
    pub fn output(&self) -> &[i64] {
        &self.output
    }

    pub fn last_output(&self) -> Option<i64> {
        self.output.last().copied()
    }

    pub fn drain_output(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.output)
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    fn check_fault(&self) -> Result<()> {
        match &self.fault {
            Some(msg) => Err(Error::Faulted(msg.clone())),
            None => Ok(()),
        }
    }

    fn cycle(&mut self) -> Result<()> {
        let result = Instruction::fetch(&self.tape, self.ip).and_then(|instr| {
            trace!("{:>6}: {instr:?}", self.ip);
            let len = instr.len();
            exec::execute(self, instr).map(|flow| (flow, len))
        });
        let (flow, len) = match result {
            Ok(ok) => ok,
            Err(e) => {
                debug!("machine faulted at ip {}: {e}", self.ip);
                self.fault = Some(e.to_string());
                return Err(e);
            }
        };

        match flow {
            Flow::Next => self.ip += len,
            Flow::Jump(target) => self.ip = target,
            Flow::Block => {
                trace!("awaiting input at ip {}", self.ip);
                self.state = State::AwaitingInput;
            }
            Flow::Halt => {
                debug!("halted at ip {} with {} outputs", self.ip, self.output.len());
                self.state = State::Halted;
            }
        }
        Ok(())
    }
}
