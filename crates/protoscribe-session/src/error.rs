//! Generation error types

use protoscribe_protocol::RequiredField;
use protoscribe_providers::ProviderError;
use thiserror::Error;

/// Which completion call of the pipeline failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Generation,
    Refinement,
}

impl Pass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Refinement => "refinement",
        }
    }
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("missing required fields: {}", join_labels(.0))]
    Validation(Vec<RequiredField>),

    #[error("{pass} pass failed: {source}")]
    Transport {
        pass: Pass,
        #[source]
        source: ProviderError,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

fn join_labels(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(RequiredField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GenerationError {
    pub fn transport(pass: Pass, source: ProviderError) -> Self {
        match source {
            ProviderError::Configuration(message) => Self::Configuration(message),
            source => Self::Transport { pass, source },
        }
    }

    /// Inline message shown next to the form
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(fields) => {
                format!("Please fill in all the fields: {}", join_labels(fields))
            }
            Self::Transport { pass, source } => {
                let hint = if source.is_auth() {
                    " Check the configured API key."
                } else if source.is_transient() {
                    " Please try again in a moment."
                } else {
                    ""
                };
                format!("An error occurred during {}: {}.{}", pass, source, hint)
            }
            Self::Configuration(message) => format!("Configuration error: {}", message),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
