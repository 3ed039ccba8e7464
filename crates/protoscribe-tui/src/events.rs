//! TUI events

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Screen;

/// Application-level action resolved from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Generate,
    CopyOutput,
    SaveOutput,
    ClearHistory,
    SwitchScreen(Screen),
    Quit,
}

impl AppEvent {
    /// Shortcuts that apply on every screen; anything else goes to the focused widget
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::F(1) => return Some(Self::SwitchScreen(Screen::Parameters)),
            KeyCode::F(2) => return Some(Self::SwitchScreen(Screen::Output)),
            _ => {}
        }

        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('g') => Some(Self::Generate),
            KeyCode::Char('y') => Some(Self::CopyOutput),
            KeyCode::Char('s') => Some(Self::SaveOutput),
            KeyCode::Char('d') => Some(Self::ClearHistory),
            _ => None,
        }
    }
}
