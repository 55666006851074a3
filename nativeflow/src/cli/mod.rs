//! Command line interface.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, DevicesArgs};
pub use handlers::{handle_build, handle_devices};
