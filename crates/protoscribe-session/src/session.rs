//! Session state

use protoscribe_protocol::HistoryEntry;
use serde::Serialize;

/// Where the session is in its generate cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Generating,
    Succeeded,
}

/// One user's transient state: the current refined text and the draft history
///
/// Created at start, reset by [`clear_history`](Self::clear_history), dropped at exit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    current_text: String,
    history: Vec<HistoryEntry>,
    #[serde(skip)]
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    /// Drafts in insertion order
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Empty the history; the current text is left as is
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Replace the current text with a user edit
    pub fn edit_current_text(&mut self, text: impl Into<String>) {
        self.current_text = text.into();
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    pub(crate) fn set_current_text(&mut self, text: String) {
        self.current_text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.current_text().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_clear_history_keeps_current_text() {
        let mut session = Session::new();
        session.set_current_text("refined".to_string());
        session.push_history(HistoryEntry::new("Use in Pregnancy", "draft", "ft:model"));

        session.clear_history();

        assert!(session.history().is_empty());
        assert_eq!(session.current_text(), "refined");
    }

    #[test]
    fn test_serializes_text_and_history_only() {
        let mut session = Session::new();
        session.set_current_text("refined".to_string());
        session.set_state(SessionState::Succeeded);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["current_text"], "refined");
        assert!(json["history"].as_array().unwrap().is_empty());
        assert!(json.get("state").is_none());
    }
}
