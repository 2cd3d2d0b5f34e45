//! CLI module for clonehub - command-line interface.
//!
//! A single command: list a user's public repositories and clone them all.

pub mod commands;

pub use commands::Cli;
