//! n64-patcher library
//!
//! Command definitions and presentation helpers behind the `n64-patcher` binary.

pub mod cli;
pub mod commands;
pub mod utils;
