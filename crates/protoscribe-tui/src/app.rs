//! Main TUI application

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use protoscribe_protocol::TrialParameters;
use protoscribe_session::{export, Generator, SessionState};
use protoscribe_telemetry::LogLine;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tui_textarea::TextArea;

use crate::views::{HistoryPanel, ToastManager};
use crate::{AppEvent, FormState, SystemClipboard, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Parameters,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFocus {
    Text,
    History,
}

/// Main TUI application state
pub struct App {
    generator: Generator,
    form: FormState,
    output: TextArea<'static>,
    history: HistoryPanel,
    screen: Screen,
    output_focus: OutputFocus,
    toasts: ToastManager,
    theme: Theme,
    /// Inline message under the form
    message: Option<String>,
    /// Last warning forwarded from tracing, shown until the next successful action
    last_log: Option<String>,
    clipboard: SystemClipboard,
    log_rx: Option<UnboundedReceiver<LogLine>>,
    save_dir: PathBuf,
    busy: bool,
    /// Last generate cycle ended in a transport or configuration error
    failed: bool,
    should_quit: bool,
}

impl App {
    pub fn new(generator: Generator, initial: TrialParameters) -> Self {
        let form = FormState::new(initial, generator.models().generation.clone());
        let output = text_area(generator.current_text());
        Self {
            generator,
            form,
            output,
            history: HistoryPanel::new(),
            screen: Screen::Parameters,
            output_focus: OutputFocus::Text,
            toasts: ToastManager::new(),
            theme: Theme::default(),
            message: None,
            last_log: None,
            clipboard: SystemClipboard::new(),
            log_rx: None,
            save_dir: PathBuf::from("."),
            busy: false,
            failed: false,
            should_quit: false,
        }
    }

    /// Show tracing warnings and errors in the status bar
    pub fn with_log_receiver(mut self, rx: UnboundedReceiver<LogLine>) -> Self {
        self.log_rx = Some(rx);
        self
    }

    /// Directory Ctrl+S writes into
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    /// Whether the status bar reports the last generation as failed
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Latest forwarded warning or error, if not yet superseded
    pub fn last_log(&self) -> Option<&str> {
        self.last_log.as_deref()
    }

    /// Text in the output area, including unsaved edits
    pub fn output_text(&self) -> String {
        self.output.lines().join("\n")
    }

    /// Run until the user quits
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.toasts.tick();
            self.drain_logs();
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match AppEvent::from_key(key) {
                        Some(AppEvent::Generate) => {
                            // show the busy state before blocking on both passes
                            self.busy = true;
                            terminal.draw(|frame| self.render(frame))?;
                            self.generate().await;
                        }
                        Some(event) => self.handle_event(event),
                        None => self.handle_input(key),
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Submit the form and wait for both passes
    pub async fn generate(&mut self) {
        self.busy = true;
        let params = self.form.parameters();
        self.generator.set_generation_model(self.form.model());

        match self.generator.generate(&params).await {
            Ok(text) => {
                self.output = text_area(&text);
                self.message = None;
                self.screen = Screen::Output;
                self.output_focus = OutputFocus::Text;
                self.last_log = None;
                self.failed = false;
                self.toasts.success("Section generated");
            }
            Err(err) => {
                let message = err.user_message();
                if !err.is_validation() {
                    self.failed = true;
                    self.toasts.error(message.clone());
                }
                self.message = Some(message);
            }
        }
        self.busy = false;
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => self.should_quit = true,
            AppEvent::SwitchScreen(screen) => self.screen = screen,
            AppEvent::ClearHistory => {
                self.generator.clear_history();
                self.history.reset();
                self.last_log = None;
                self.toasts.success("History cleared");
            }
            AppEvent::CopyOutput => match self.clipboard.copy(&self.output_text()) {
                Ok(()) => {
                    self.last_log = None;
                    self.toasts.success("Text copied to clipboard!");
                }
                Err(e) => self.toasts.error(e.to_string()),
            },
            AppEvent::SaveOutput => match self.save_output() {
                Ok(path) => {
                    self.last_log = None;
                    self.toasts.success(format!("Saved to {}", path.display()));
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to save section");
                    self.toasts.error(format!("Save failed: {}", e));
                }
            },
            // needs the terminal to show the busy state; run() handles it
            AppEvent::Generate => {}
        }
    }

    /// Write the output area, edits included, as Markdown into the save directory
    pub fn save_output(&mut self) -> io::Result<PathBuf> {
        let text = self.output_text();
        if text.trim().is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "nothing to save"));
        }
        self.generator.session_mut().edit_current_text(text.clone());

        let title = self.form.parameters().section_request;
        let path = self.save_dir.join(file_name_for(&title));
        export::write_markdown(&path, &title, &text)?;
        Ok(path)
    }

    fn handle_input(&mut self, key: KeyEvent) {
        match self.screen {
            Screen::Parameters => {
                if key.code == KeyCode::Esc {
                    self.should_quit = true;
                } else {
                    self.form.handle_key(key);
                }
            }
            Screen::Output => match (self.output_focus, key.code) {
                (_, KeyCode::Tab) => {
                    self.output_focus = match self.output_focus {
                        OutputFocus::Text => OutputFocus::History,
                        OutputFocus::History => OutputFocus::Text,
                    };
                }
                (_, KeyCode::Esc) => self.screen = Screen::Parameters,
                (OutputFocus::Text, _) => {
                    self.output.input(key);
                }
                (OutputFocus::History, _) => {
                    self.history.handle_key(key, self.generator.history());
                }
            },
        }
    }

    /// Pull forwarded log lines into toasts and the status bar
    pub fn drain_logs(&mut self) {
        let Some(rx) = self.log_rx.as_mut() else {
            return;
        };
        while let Ok(line) = rx.try_recv() {
            if line.is_error() {
                self.toasts.error(line.message.clone());
            } else {
                self.toasts.warning(line.message.clone());
            }
            self.last_log = Some(line.to_string());
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Min(5),    // Screen
                Constraint::Length(1), // Status
            ])
            .split(frame.area());

        self.render_tabs(frame, chunks[0]);
        match self.screen {
            Screen::Parameters => self.render_parameters(frame, chunks[1]),
            Screen::Output => self.render_output(frame, chunks[1]),
        }
        self.render_status(frame, chunks[2]);
        self.toasts.render(frame, chunks[1], &self.theme);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let tab = |label: &'static str, screen: Screen| {
            let style = if self.screen == screen {
                Style::default().fg(Color::Black).bg(self.theme.accent)
            } else {
                Style::default().fg(self.theme.muted)
            };
            Span::styled(label, style)
        };
        let line = Line::from(vec![
            Span::styled(" Protoscribe ", Style::default().fg(self.theme.accent)),
            tab(" F1 Parameters ", Screen::Parameters),
            Span::raw(" "),
            tab(" F2 Output ", Screen::Output),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_parameters(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(3)])
            .split(area);

        self.form.render(frame, chunks[0], &self.theme);

        let (text, color) = match &self.message {
            Some(message) => (message.as_str(), self.theme.error),
            None => (
                "Tab/Shift-Tab move · ←/→ adjust sliders · Ctrl+G generate",
                self.theme.muted,
            ),
        };
        let message = Paragraph::new(Span::styled(text, Style::default().fg(color)))
            .block(Block::default().borders(Borders::TOP))
            .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[1]);
    }

    fn render_output(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let text_focused = self.output_focus == OutputFocus::Text;
        self.output.set_block(
            Block::default()
                .title(" Generated Text (Ctrl+Y copy · Ctrl+S save) ")
                .borders(Borders::ALL)
                .border_style(self.theme.border(text_focused)),
        );
        frame.render_widget(&self.output, chunks[0]);

        self.history.render(
            frame,
            chunks[1],
            self.generator.history(),
            !text_focused,
            &self.theme,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let (label, color) = if self.busy {
            ("Generating...", self.theme.warning)
        } else if self.failed {
            ("Failed", self.theme.error)
        } else {
            match self.generator.session().state() {
                SessionState::Idle => ("Idle", self.theme.muted),
                SessionState::Generating => ("Generating...", self.theme.warning),
                SessionState::Succeeded => ("Done", self.theme.success),
            }
        };

        let detail = self.last_log.clone().unwrap_or_else(|| {
            format!(
                "{} · {} entries · Ctrl+D clear history · Ctrl+Q quit",
                self.generator.provider(),
                self.generator.history().len()
            )
        });

        let spans = vec![
            Span::styled(
                format!(" {} ", label),
                Style::default().fg(Color::Black).bg(color),
            ),
            Span::raw(" "),
            Span::styled(detail, Style::default().fg(self.theme.muted)),
        ];
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn text_area(text: &str) -> TextArea<'static> {
    if text.is_empty() {
        TextArea::default()
    } else {
        TextArea::new(text.lines().map(str::to_string).collect())
    }
}

/// `Use in Pregnancy` -> `use-in-pregnancy.md`
fn file_name_for(title: &str) -> PathBuf {
    let slug = title
        .trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let stem = if slug.is_empty() {
        "protocol-section"
    } else {
        slug.as_str()
    };
    Path::new(stem).with_extension("md")
}
