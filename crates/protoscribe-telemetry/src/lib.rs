//! Logging setup
//!
//! Headless commands log to stderr so `--json` output on stdout stays clean.
//! The TUI owns the terminal, so its subscriber forwards warnings and errors
//! over a channel to the status bar instead of printing them.

mod subscriber;

pub use subscriber::{
    init_subscriber, init_tui_subscriber, ChannelLayer, LogLine, TelemetryConfig,
};
