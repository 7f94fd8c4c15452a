//! Deprecator command line
//!
//! - [`args`]: turns the command line into jobs and a run configuration
//! - [`logging`]: installs the log subscriber

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod args;
pub mod logging;

pub use args::{command, parse, split_message, ArgsError, Invocation, MESSAGE_FLAG};
pub use logging::init_tracing;

/// Exit status for startup errors, matching clap's usage errors
pub const STARTUP_FAILURE: u8 = 2;
