pub mod error;
pub mod loader;
pub mod schema;

pub use error::ConfigError;
pub use loader::{
    find_config_file, load_config_from_file, resolve_config, ConfigFormat, ResolvedConfig, CONFIG_CANDIDATES,
};
pub use schema::{
    GenerationSettings, ModelSettings, ProtoscribeConfig, ProviderSettings, TelemetrySettings,
    API_KEY_ENV, DEFAULT_GENERATION_MODEL, DEFAULT_REFINEMENT_MODEL,
};
