//! App behaviour without a terminal

use async_trait::async_trait;
use protoscribe_protocol::{Completion, CompletionRequest, TrialParameters};
use protoscribe_providers::{CompletionClient, ProviderError, ProviderResult};
use protoscribe_session::{Generator, SessionState};
use protoscribe_telemetry::LogLine;
use protoscribe_tui::{App, AppEvent, Screen};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Returns canned texts in order, then fails
struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    models: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            models: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        self.models.lock().unwrap().push(request.model.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(text) => Ok(Completion::text(request.model.clone(), text)),
            None => Err(ProviderError::Unavailable {
                provider: "scripted".to_string(),
            }),
        }
    }

    fn provider(&self) -> &str {
        "scripted"
    }
}

fn filled() -> TrialParameters {
    TrialParameters {
        phase: "I".to_string(),
        moa_category: "checkpoint inhibitor".to_string(),
        specific_moa: "anti-PD-1 antibody".to_string(),
        cancer_type: "NSCLC".to_string(),
        subtype: "squamous".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_generate_shows_refined_text() {
    let client = ScriptedClient::new(&["draft", "refined line 1\nrefined line 2"]);
    let mut app = App::new(Generator::new(client.clone()), filled());

    app.generate().await;

    assert_eq!(app.screen(), Screen::Output);
    assert_eq!(app.output_text(), "refined line 1\nrefined line 2");
    assert_eq!(app.generator().history().len(), 1);
    assert!(app.message().is_none());
    assert_eq!(client.models.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_fields_show_inline_message() {
    let client = ScriptedClient::new(&[]);
    let mut app = App::new(Generator::new(client.clone()), TrialParameters::default());

    app.generate().await;

    assert_eq!(app.screen(), Screen::Parameters);
    let message = app.message().unwrap();
    assert!(message.starts_with("Please fill in all the fields: Phase, MOA Category"));
    assert!(!app.failed());
    assert!(client.models.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_refinement_keeps_previous_output() {
    let client = ScriptedClient::new(&["draft", "first result", "draft again"]);
    let mut app = App::new(Generator::new(client), filled());

    app.generate().await;
    app.generate().await;

    assert_eq!(app.output_text(), "first result");
    assert!(app.message().unwrap().contains("refinement"));
    assert_eq!(app.generator().history().len(), 1);
    assert!(app.failed());
    assert_eq!(app.generator().session().state(), SessionState::Idle);
}

#[tokio::test]
async fn test_clear_history_and_switch_screens() {
    let client = ScriptedClient::new(&["draft", "refined"]);
    let mut app = App::new(Generator::new(client), filled());
    app.generate().await;

    app.handle_event(AppEvent::ClearHistory);
    app.handle_event(AppEvent::SwitchScreen(Screen::Parameters));

    assert!(app.generator().history().is_empty());
    assert_eq!(app.output_text(), "refined");
    assert_eq!(app.screen(), Screen::Parameters);
}

#[tokio::test]
async fn test_save_output_writes_markdown() {
    let dir = tempfile::TempDir::new().unwrap();
    let client = ScriptedClient::new(&["draft", "Refined body."]);
    let mut app = App::new(Generator::new(client), filled()).with_save_dir(dir.path());
    app.generate().await;

    let path = app.save_output().unwrap();

    assert_eq!(path, dir.path().join("use-in-pregnancy.md"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "# Use in Pregnancy\n\nRefined body.\n");
}

#[tokio::test]
async fn test_save_without_output_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let client = ScriptedClient::new(&[]);
    let mut app = App::new(Generator::new(client), filled()).with_save_dir(dir.path());
    assert!(app.save_output().is_err());
}

#[tokio::test]
async fn test_warning_in_status_bar_clears_after_success() {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let client = ScriptedClient::new(&["draft", "refined"]);
    let mut app = App::new(Generator::new(client), filled()).with_log_receiver(rx);

    tx.send(LogLine {
        level: tracing::Level::WARN,
        target: "protoscribe_session".to_string(),
        message: "refinement slow".to_string(),
    })
    .unwrap();
    app.drain_logs();
    assert_eq!(app.last_log(), Some("WARN refinement slow"));

    app.generate().await;
    assert_eq!(app.last_log(), None);
}

#[tokio::test]
async fn test_failed_generation_keeps_warning() {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let client = ScriptedClient::new(&[]);
    let mut app = App::new(Generator::new(client), filled()).with_log_receiver(rx);

    tx.send(LogLine {
        level: tracing::Level::ERROR,
        target: "protoscribe_session".to_string(),
        message: "generation pass failed".to_string(),
    })
    .unwrap();
    app.drain_logs();
    app.generate().await;

    assert_eq!(app.last_log(), Some("ERROR generation pass failed"));
}

#[test]
fn test_quit_event() {
    let client = ScriptedClient::new(&[]);
    let mut app = App::new(Generator::new(client), filled());
    app.handle_event(AppEvent::Quit);
    assert!(app.should_quit());
}
