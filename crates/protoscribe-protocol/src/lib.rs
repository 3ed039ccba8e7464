//! Protoscribe Protocol - Shared types
//!
//! This crate defines the types passed between the prompt builder, the
//! completion client and the session orchestrator:
//! - Trial parameters collected from the form
//! - Chat messages and completion requests/responses
//! - Session history entries

mod completion;
mod history;
mod messages;
mod trial;

pub use completion::*;
pub use history::*;
pub use messages::*;
pub use trial::*;
