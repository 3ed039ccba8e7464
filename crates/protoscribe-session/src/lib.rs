//! Protoscribe Session - generation pipeline and session state
//!
//! A [`Generator`] owns one [`Session`] and runs the two-pass pipeline:
//! the generation prompt goes to the domain model, the resulting draft is
//! embedded in the refinement prompt and sent to the general model, and the
//! refined text becomes the session's current text.

mod error;
pub mod export;
mod generator;
mod session;

pub use error::{GenerationError, Pass};
pub use generator::{Generator, ModelPair};
pub use protoscribe_protocol::HistoryPolicy;
pub use session::{Session, SessionState};
