//! Protoscribe CLI - Command-line interface
//!
//! This crate provides the `protoscribe` binary:
//! - Interactive mode (default): the two-screen TUI
//! - `generate`: headless generation for scripts
//! - `config` / `auth`: inspect configuration and credentials

pub mod commands;

pub use commands::{AuthCommands, Cli, Commands, ConfigCommands, GenerateArgs};
