//! Clinical-trial parameters collected from the form

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Bounds accepted for the letter limit of a generated section
pub const LENGTH_LIMIT_RANGE: RangeInclusive<u32> = 100..=15_000;
/// Step used by the form when nudging the letter limit
pub const LENGTH_LIMIT_STEP: u32 = 100;
pub const DEFAULT_LENGTH_LIMIT: u32 = 1_000;

/// Bounds accepted for the sampling temperature
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.5..=1.5;
pub const TEMPERATURE_STEP: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Output token cap sent with both passes unless configured otherwise
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 15_000;

pub const DEFAULT_SECTION_REQUEST: &str = "Use in Pregnancy";

/// One of the five identifying fields that must be filled before generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Phase,
    MoaCategory,
    SpecificMoa,
    CancerType,
    Subtype,
}

impl RequiredField {
    pub const ALL: [RequiredField; 5] = [
        Self::Phase,
        Self::MoaCategory,
        Self::SpecificMoa,
        Self::CancerType,
        Self::Subtype,
    ];

    /// Form label for this field
    pub fn label(&self) -> &'static str {
        match self {
            Self::Phase => "Phase",
            Self::MoaCategory => "MOA Category",
            Self::SpecificMoa => "Specific MOA",
            Self::CancerType => "Cancer Type",
            Self::Subtype => "Subtype",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the prompt builder needs to describe one protocol section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialParameters {
    pub phase: String,
    pub moa_category: String,
    pub specific_moa: String,
    pub cancer_type: String,
    pub subtype: String,
    /// Target length of the section, in letters
    pub length_limit: u32,
    pub temperature: f32,
    pub section_request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_request: Option<String>,
}

impl Default for TrialParameters {
    fn default() -> Self {
        Self {
            phase: String::new(),
            moa_category: String::new(),
            specific_moa: String::new(),
            cancer_type: String::new(),
            subtype: String::new(),
            length_limit: DEFAULT_LENGTH_LIMIT,
            temperature: DEFAULT_TEMPERATURE,
            section_request: DEFAULT_SECTION_REQUEST.to_string(),
            additional_request: None,
        }
    }
}

impl TrialParameters {
    pub fn field(&self, field: RequiredField) -> &str {
        match field {
            RequiredField::Phase => &self.phase,
            RequiredField::MoaCategory => &self.moa_category,
            RequiredField::SpecificMoa => &self.specific_moa,
            RequiredField::CancerType => &self.cancer_type,
            RequiredField::Subtype => &self.subtype,
        }
    }

    /// Required fields that are empty or whitespace-only, in form order
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|f| self.field(*f).trim().is_empty())
            .collect()
    }

    pub fn validate(&self) -> Result<(), Vec<RequiredField>> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// Additional request with surrounding whitespace removed, `None` when blank
    pub fn additional_request(&self) -> Option<&str> {
        self.additional_request
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Copy with the numeric fields pulled back inside the form bounds
    pub fn clamped(mut self) -> Self {
        self.length_limit = self
            .length_limit
            .clamp(*LENGTH_LIMIT_RANGE.start(), *LENGTH_LIMIT_RANGE.end());
        self.temperature = clamp_temperature(self.temperature);
        self
    }
}

/// Clamp a temperature into range and round it to the slider step
pub fn clamp_temperature(temperature: f32) -> f32 {
    let clamped = temperature.clamp(*TEMPERATURE_RANGE.start(), *TEMPERATURE_RANGE.end());
    (clamped * 10.0).round() / 10.0
}
