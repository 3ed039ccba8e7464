//! Toast notifications
//!
//! Toasts stack in the bottom-right corner and disappear after their duration.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::Theme;

const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastVariant {
    fn color(&self, theme: &Theme) -> Color {
        match self {
            Self::Success => theme.success,
            Self::Error => theme.error,
            Self::Warning => theme.warning,
            Self::Info => theme.accent,
        }
    }

    /// Errors stay up longer than confirmations
    fn duration(&self) -> Duration {
        match self {
            Self::Error => Duration::from_secs(8),
            Self::Warning => Duration::from_secs(5),
            Self::Success | Self::Info => Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub variant: ToastVariant,
    expires_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, variant: ToastVariant) -> Self {
        Self::with_duration(message, variant, variant.duration())
    }

    pub fn with_duration(
        message: impl Into<String>,
        variant: ToastVariant,
        duration: Duration,
    ) -> Self {
        Self {
            message: message.into(),
            variant,
            expires_at: Instant::now() + duration,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_VISIBLE {
            self.toasts.pop_front();
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastVariant::Success));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastVariant::Error));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastVariant::Warning));
    }

    /// Drop expired toasts; call before rendering
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|toast| !toast.is_expired(now));
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.toasts.iter().map(|t| t.message.as_str())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = 48.min(area.width.saturating_sub(2));
        let height = 4;
        let mut bottom = area.bottom();

        for toast in self.toasts.iter().rev() {
            let top = bottom.saturating_sub(height);
            if top < area.top() || width == 0 {
                break;
            }

            let toast_area = Rect {
                x: area.right().saturating_sub(width + 1),
                y: top,
                width,
                height,
            };

            let color = toast.variant.color(theme);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color));
            let content = Line::from(vec![
                Span::styled("█ ", Style::default().fg(color)),
                Span::raw(toast.message.as_str()),
            ]);

            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(content)
                    .block(block)
                    .wrap(Wrap { trim: true }),
                toast_area,
            );
            bottom = top;
        }
    }
}
