//! Workflow entry points.
//!
//! - `run_poll`: announce newly published notices and commit the seen-state
//! - `run_prime`: remember the current page without announcing it
//! - `CommandHandler`: answer bot commands on demand

pub mod commands;
pub mod diff;
pub mod poll;

pub use commands::{Command, CommandHandler};
pub use diff::diff;
pub use poll::{PollContext, PollOutcome, run_poll, run_prime};
