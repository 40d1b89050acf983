use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading or executing an Intcode program.
///
/// The first group are machine faults: they stop the affected machine and are
/// never retried. Blocking on input is not an error (see `State::AwaitingInput`).
#[derive(Debug, Error)]
pub enum Error {
    #[error("negative address {0}")]
    InvalidAddress(i64),
    #[error("unknown opcode {opcode} at address {address}")]
    UnknownOpcode { opcode: i64, address: i64 },
    #[error("unknown parameter mode {mode} at address {address}")]
    InvalidMode { mode: i64, address: i64 },
    #[error("immediate mode used as a write target at address {0}")]
    InvalidWriteMode(i64),
    #[error("arithmetic overflow at address {0}")]
    Overflow(i64),
    #[error("machine already faulted: {0}")]
    Faulted(String),

    #[error("invalid program cell {token:?} at index {index}")]
    Parse { index: usize, token: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// True for errors raised by the machine itself while executing.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Error::InvalidAddress(_)
                | Error::UnknownOpcode { .. }
                | Error::InvalidMode { .. }
                | Error::InvalidWriteMode(_)
                | Error::Overflow(_)
                | Error::Faulted(_)
        )
    }
}
