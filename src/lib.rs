pub mod error;
pub mod tape;
pub mod decode;
pub mod operand;
mod exec;
pub mod machine;
pub mod program;
pub mod disasm;

pub mod explore;
pub mod probe;
pub mod arcade;
pub mod amplifier;
pub mod robot;
pub mod fuzz;

pub use error::{Error, Result};
pub use machine::{Machine, State};
pub use tape::Tape;
