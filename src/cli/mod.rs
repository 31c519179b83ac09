//! CLI module
//!
//! # Commands
//!
//! - `links` - Parse a Links header
//! - `browse` - Page through a configured list from stdin commands
//! - `validate` - Fill and submit a configured form

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
