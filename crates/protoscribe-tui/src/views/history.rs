//! Draft history panel, newest entry first

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent};
use protoscribe_protocol::{EntryId, HistoryEntry};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::Theme;

#[derive(Debug, Default)]
pub struct HistoryPanel {
    state: ListState,
    expanded: HashSet<EntryId>,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry under the cursor; `entries` are in insertion order
    pub fn selected<'a>(&self, entries: &'a [HistoryEntry]) -> Option<&'a HistoryEntry> {
        let idx = self.state.selected()?;
        entries.iter().rev().nth(idx)
    }

    pub fn is_expanded(&self, entry: &HistoryEntry) -> bool {
        self.expanded.contains(&entry.id)
    }

    pub fn reset(&mut self) {
        self.state.select(None);
        self.expanded.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent, entries: &[HistoryEntry]) -> bool {
        if entries.is_empty() {
            return false;
        }
        let last = entries.len() - 1;

        match key.code {
            KeyCode::Up => {
                let idx = self.state.selected().map_or(0, |i| i.saturating_sub(1));
                self.state.select(Some(idx));
            }
            KeyCode::Down => {
                let idx = self.state.selected().map_or(0, |i| (i + 1).min(last));
                self.state.select(Some(idx));
            }
            KeyCode::Enter => {
                if self.state.selected().is_none() {
                    self.state.select(Some(0));
                }
                if let Some(entry) = self.selected(entries) {
                    let id = entry.id.clone();
                    if !self.expanded.remove(&id) {
                        self.expanded.insert(id);
                    }
                }
            }
            _ => return false,
        }
        true
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        entries: &[HistoryEntry],
        focused: bool,
        theme: &Theme,
    ) {
        let block = Block::default()
            .title(format!(" History ({}) ", entries.len()))
            .borders(Borders::ALL)
            .border_style(theme.border(focused));

        if entries.is_empty() {
            let empty = List::new([ListItem::new(Span::styled(
                "No history yet.",
                Style::default().fg(theme.muted),
            ))])
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .rev()
            .enumerate()
            .map(|(idx, entry)| {
                let marker = if self.is_expanded(entry) { "▾" } else { "▸" };
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        format!("{} {}. {}", marker, idx + 1, entry.title),
                        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", entry.created_at.format("%H:%M:%S")),
                        Style::default().fg(theme.muted),
                    ),
                ])];
                if self.is_expanded(entry) {
                    lines.extend(
                        entry
                            .content
                            .lines()
                            .map(|line| Line::from(format!("  {}", line))),
                    );
                }
                ListItem::new(Text::from(lines))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(theme.accent));
        frame.render_stateful_widget(list, area, &mut self.state);
    }
}
