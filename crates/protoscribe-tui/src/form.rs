//! Parameters form state and rendering

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use protoscribe_protocol::{
    clamp_temperature, TrialParameters, LENGTH_LIMIT_RANGE, LENGTH_LIMIT_STEP, TEMPERATURE_STEP,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Phase,
    MoaCategory,
    SpecificMoa,
    CancerType,
    Subtype,
    LengthLimit,
    Temperature,
    Model,
    SectionRequest,
    AdditionalRequest,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        Self::Phase,
        Self::MoaCategory,
        Self::SpecificMoa,
        Self::CancerType,
        Self::Subtype,
        Self::LengthLimit,
        Self::Temperature,
        Self::Model,
        Self::SectionRequest,
        Self::AdditionalRequest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Phase => "Phase",
            Self::MoaCategory => "MOA Category",
            Self::SpecificMoa => "Specific MOA",
            Self::CancerType => "Cancer Type",
            Self::Subtype => "Subtype",
            Self::LengthLimit => "Letter Limit",
            Self::Temperature => "Temperature",
            Self::Model => "Model",
            Self::SectionRequest => "Section Request",
            Self::AdditionalRequest => "Additional Request (optional)",
        }
    }

    pub fn is_slider(&self) -> bool {
        matches!(self, Self::LengthLimit | Self::Temperature)
    }
}

/// Values typed into the form plus which field has focus
#[derive(Debug, Clone)]
pub struct FormState {
    params: TrialParameters,
    additional: String,
    model: String,
    focus: usize,
}

impl FormState {
    pub fn new(params: TrialParameters, model: impl Into<String>) -> Self {
        let additional = params.additional_request.clone().unwrap_or_default();
        Self {
            params,
            additional,
            model: model.into(),
            focus: 0,
        }
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    /// Parameters to submit; the additional request is `None` when blank
    pub fn parameters(&self) -> TrialParameters {
        let mut params = self.params.clone();
        params.additional_request = if self.additional.trim().is_empty() {
            None
        } else {
            Some(self.additional.clone())
        };
        params
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Phase => self.params.phase.clone(),
            FormField::MoaCategory => self.params.moa_category.clone(),
            FormField::SpecificMoa => self.params.specific_moa.clone(),
            FormField::CancerType => self.params.cancer_type.clone(),
            FormField::Subtype => self.params.subtype.clone(),
            FormField::LengthLimit => self.params.length_limit.to_string(),
            FormField::Temperature => format!("{:.1}", self.params.temperature),
            FormField::Model => self.model.clone(),
            FormField::SectionRequest => self.params.section_request.clone(),
            FormField::AdditionalRequest => self.additional.clone(),
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Phase => Some(&mut self.params.phase),
            FormField::MoaCategory => Some(&mut self.params.moa_category),
            FormField::SpecificMoa => Some(&mut self.params.specific_moa),
            FormField::CancerType => Some(&mut self.params.cancer_type),
            FormField::Subtype => Some(&mut self.params.subtype),
            FormField::Model => Some(&mut self.model),
            FormField::SectionRequest => Some(&mut self.params.section_request),
            FormField::AdditionalRequest => Some(&mut self.additional),
            FormField::LengthLimit | FormField::Temperature => None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FormField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    fn nudge(&mut self, up: bool) {
        match self.focused() {
            FormField::LengthLimit => {
                let current = self.params.length_limit;
                let next = if up {
                    current.saturating_add(LENGTH_LIMIT_STEP)
                } else {
                    current.saturating_sub(LENGTH_LIMIT_STEP)
                };
                self.params.length_limit =
                    next.clamp(*LENGTH_LIMIT_RANGE.start(), *LENGTH_LIMIT_RANGE.end());
            }
            FormField::Temperature => {
                let delta = if up { TEMPERATURE_STEP } else { -TEMPERATURE_STEP };
                self.params.temperature = clamp_temperature(self.params.temperature + delta);
            }
            _ => {}
        }
    }

    /// Apply a key to the focused field. Returns false when the key was not used.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Left if self.focused().is_slider() => self.nudge(false),
            KeyCode::Right if self.focused().is_slider() => self.nudge(true),
            KeyCode::Backspace => {
                let field = self.focused();
                match self.text_mut(field) {
                    Some(text) => {
                        text.pop();
                    }
                    None => return false,
                }
            }
            KeyCode::Enter if self.focused() == FormField::AdditionalRequest => {
                self.additional.push('\n');
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let field = self.focused();
                match self.text_mut(field) {
                    Some(text) => text.push(c),
                    None => return false,
                }
            }
            _ => return false,
        }
        true
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let constraints: Vec<Constraint> = FormField::ALL
            .iter()
            .map(|field| match field {
                FormField::AdditionalRequest => Constraint::Min(3),
                _ => Constraint::Length(3),
            })
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, field) in FormField::ALL.iter().enumerate() {
            let focused = idx == self.focus;
            let block = Block::default()
                .title(Span::styled(format!(" {} ", field.label()), theme.label(focused)))
                .borders(Borders::ALL)
                .border_style(theme.border(focused));

            let value = self.value(*field);
            let line = if field.is_slider() {
                Line::from(vec![
                    Span::styled("◀ ", theme.label(focused)),
                    Span::raw(value),
                    Span::styled(" ▶", theme.label(focused)),
                ])
            } else if focused {
                Line::from(format!("{}_", value))
            } else {
                Line::from(value)
            };

            let paragraph = Paragraph::new(line)
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, rows[idx]);
        }
    }
}
