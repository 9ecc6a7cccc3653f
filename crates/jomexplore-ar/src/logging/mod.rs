//! Logger initialization.
//!
//! The crate logs through the `log` facade only; hosts that bring their own
//! backend can skip [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
