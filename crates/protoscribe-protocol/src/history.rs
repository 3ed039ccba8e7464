//! Session history entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// History entry identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A first-pass draft recorded in the session history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    /// Section request at the time of generation
    pub title: String,
    /// First-pass generated text
    pub content: String,
    /// Model that produced the draft
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            title: title.into(),
            content: content.into(),
            model: model.into(),
            created_at: Utc::now(),
        }
    }
}

/// Pipeline stage after which a first-pass draft enters the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Record the draft only once refinement has also succeeded
    #[default]
    AfterRefinement,
    /// Record the draft as soon as the generation pass returns
    AfterDraft,
}

impl HistoryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterRefinement => "after_refinement",
            Self::AfterDraft => "after_draft",
        }
    }
}

impl std::fmt::Display for HistoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
