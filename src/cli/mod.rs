//! Command line interface

pub mod args;
pub mod commands;
pub mod errors;

pub use args::{Cli, Command};
pub use errors::{CliError, CliResult};
