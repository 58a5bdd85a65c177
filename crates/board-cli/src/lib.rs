//! Request Board CLI
//!
//! Library half of the `request-board` binary:
//! - Argument parsing and configuration layering
//! - Command execution against a `RequestStore`
//! - Text rendering of the board and list views

#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;
pub mod resolve;

pub use cli::{BoardCommand, GlobalOptions};
pub use commands::execute;
