//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod read_log;
mod simulate;
mod validate_data;

pub use read_log::ReadLog;
pub use simulate::Simulate;
pub use validate_data::ValidateData;
