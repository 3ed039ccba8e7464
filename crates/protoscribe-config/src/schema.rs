use protoscribe_protocol::{
    HistoryPolicy, TrialParameters, DEFAULT_LENGTH_LIMIT, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_TEMPERATURE, LENGTH_LIMIT_RANGE, TEMPERATURE_RANGE,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::loader::has_env_reference;
use crate::ConfigError;

/// Environment variable consulted when the config file carries no key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_GENERATION_MODEL: &str = "ft:gpt-4o-mini-2024-07-18:medirama::AmzAIoxv";
pub const DEFAULT_REFINEMENT_MODEL: &str = "gpt-4o-mini";

/// Main Protoscribe configuration
///
/// Configuration is loaded from (in priority order):
/// 1. `protoscribe.jsonc` - JSON with comments
/// 2. `protoscribe.json` - Standard JSON
/// 3. `protoscribe.yml` / `protoscribe.yaml` - YAML format
///
/// Also checks hidden variants (`.protoscribe.*`) and `~/.config/protoscribe/`
/// for global config. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtoscribeConfig {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub models: ModelSettings,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

// ============================================================================
// Provider
// ============================================================================

/// Completion endpoint settings
///
/// # Example
///
/// ```yaml
/// provider:
///   base_url: https://api.openai.com
///   api_key: ${OPENAI_API_KEY}
///   timeout_secs: 120
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; falls back to `OPENAI_API_KEY` when absent or blank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

// ============================================================================
// Models
// ============================================================================

/// Model identifiers for the two passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Fine-tuned domain model used for the draft
    #[serde(default = "default_generation_model")]
    pub generation: String,

    /// General model used to refine the draft
    #[serde(default = "default_refinement_model")]
    pub refinement: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            generation: default_generation_model(),
            refinement: default_refinement_model(),
        }
    }
}

fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_refinement_model() -> String {
    DEFAULT_REFINEMENT_MODEL.to_string()
}

// ============================================================================
// Generation defaults
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_length_limit")]
    pub length_limit: u32,

    /// Forwarded as `max_tokens` on both calls; omitted when unset
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: Option<u32>,

    /// Ask the refinement pass to replace company and medicine names
    #[serde(default = "default_true")]
    pub deidentify: bool,

    #[serde(default)]
    pub history_policy: HistoryPolicy,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            length_limit: default_length_limit(),
            max_output_tokens: default_max_output_tokens(),
            deidentify: true,
            history_policy: HistoryPolicy::default(),
        }
    }
}

impl GenerationSettings {
    /// Empty form pre-filled with the configured numeric defaults
    pub fn initial_parameters(&self) -> TrialParameters {
        TrialParameters {
            temperature: self.temperature,
            length_limit: self.length_limit,
            ..Default::default()
        }
    }
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_length_limit() -> u32 {
    DEFAULT_LENGTH_LIMIT
}

fn default_max_output_tokens() -> Option<u32> {
    Some(DEFAULT_MAX_OUTPUT_TOKENS)
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Telemetry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_output: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_output: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ProtoscribeConfig {
    /// Resolve the API key from the config, then from `OPENAI_API_KEY`
    pub fn resolve_api_key(&self) -> Result<SecretString, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Like [`resolve_api_key`](Self::resolve_api_key) with an injectable environment
    pub fn resolve_api_key_with<F>(&self, env: F) -> Result<SecretString, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_config = self
            .provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !has_env_reference(key))
            .map(str::to_string);

        from_config
            .or_else(|| {
                env(API_KEY_ENV)
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
            })
            .map(SecretString::from)
            .ok_or(ConfigError::MissingCredential { env: API_KEY_ENV })
    }

    /// Check numeric defaults against the form bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temperature = self.generation.temperature;
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ConfigError::OutOfRange {
                field: "generation.temperature",
                min: TEMPERATURE_RANGE.start().to_string(),
                max: TEMPERATURE_RANGE.end().to_string(),
                value: temperature.to_string(),
            });
        }

        let length = self.generation.length_limit;
        if !LENGTH_LIMIT_RANGE.contains(&length) {
            return Err(ConfigError::OutOfRange {
                field: "generation.length_limit",
                min: LENGTH_LIMIT_RANGE.start().to_string(),
                max: LENGTH_LIMIT_RANGE.end().to_string(),
                value: length.to_string(),
            });
        }

        Ok(())
    }
}
