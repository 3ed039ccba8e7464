use crate::schema::ProtoscribeConfig;
use crate::ConfigError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Jsonc,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext {
            "jsonc" => Some(Self::Jsonc),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Jsonc => "JSONC",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// A loaded configuration and where it came from
///
/// `path` and `format` are `None` when no file was found and defaults apply.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ProtoscribeConfig,
    pub path: Option<PathBuf>,
    pub format: Option<ConfigFormat>,
}

/// Load the explicit path if given, otherwise the first discovered file,
/// otherwise defaults
pub fn resolve_config(config_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let path = config_path.map(|p| p.to_path_buf()).or_else(find_config_file);

    match path {
        Some(path) => load_config_from_file(&path),
        None => Ok(ResolvedConfig {
            config: ProtoscribeConfig::default(),
            path: None,
            format: None,
        }),
    }
}

pub fn load_config_from_file(path: &Path) -> Result<ResolvedConfig, ConfigError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))?;

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse_config_content(&content, format).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        format: format.name(),
        message,
    })?;

    Ok(ResolvedConfig {
        config: expand_env_vars(config),
        path: Some(path.to_path_buf()),
        format: Some(format),
    })
}

fn parse_config_content(content: &str, format: ConfigFormat) -> Result<ProtoscribeConfig, String> {
    match format {
        ConfigFormat::Jsonc => json5::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml_ng::from_str(content).map_err(|e| e.to_string()),
    }
}

pub const CONFIG_CANDIDATES: &[&str] = &[
    "protoscribe.jsonc",
    "protoscribe.json",
    "protoscribe.yml",
    "protoscribe.yaml",
    ".protoscribe.jsonc",
    ".protoscribe.json",
    ".protoscribe.yml",
    ".protoscribe.yaml",
];

fn global_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("protoscribe"))
}

fn candidate_paths() -> impl Iterator<Item = PathBuf> {
    let local = CONFIG_CANDIDATES.iter().map(PathBuf::from);
    let global = global_config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_CANDIDATES.iter().map(move |c| dir.join(c)));
    local.chain(global)
}

pub fn find_config_file() -> Option<PathBuf> {
    candidate_paths().find(|path| path.exists())
}

fn expand_env_vars(mut config: ProtoscribeConfig) -> ProtoscribeConfig {
    config.provider.base_url = expand_env_string(&config.provider.base_url).value;
    // a key that still names an unset variable is treated as absent
    config.provider.api_key = config
        .provider
        .api_key
        .as_deref()
        .map(expand_env_string)
        .filter(|expanded| expanded.unresolved.is_empty())
        .map(|expanded| expanded.value);
    config.models.generation = expand_env_string(&config.models.generation).value;
    config.models.refinement = expand_env_string(&config.models.refinement).value;
    config.telemetry.level = expand_env_string(&config.telemetry.level).value;
    config
}

/// A string after `$VAR`/`${VAR}` substitution
#[derive(Debug, Clone, PartialEq, Eq)]
struct Expansion {
    value: String,
    /// Variables that were not set; their references are kept verbatim in `value`
    unresolved: Vec<String>,
}

fn expand_env_string(s: &str) -> Expansion {
    expand_env_string_with(s, |name| env::var(name).ok())
}

fn expand_env_string_with<F>(s: &str, lookup: F) -> Expansion
where
    F: Fn(&str) -> Option<String>,
{
    let mut value = String::new();
    let mut unresolved = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            value.push(ch);
            continue;
        }

        if chars.peek() == Some(&'{') {
            chars.next();
            let var_name: String = chars.by_ref().take_while(|&c| c != '}').collect();
            match lookup(&var_name) {
                Some(resolved) => value.push_str(&resolved),
                None => {
                    value.push_str("${");
                    value.push_str(&var_name);
                    value.push('}');
                    unresolved.push(var_name);
                }
            }
        } else {
            // stop at the first non-identifier char without consuming it
            let mut var_name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    var_name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                value.push('$');
            } else if let Some(resolved) = lookup(&var_name) {
                value.push_str(&resolved);
            } else {
                value.push('$');
                value.push_str(&var_name);
                unresolved.push(var_name);
            }
        }
    }

    Expansion { value, unresolved }
}

/// Whether `s` still contains a `$VAR` or `${VAR}` reference
pub(crate) fn has_env_reference(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '$' {
            if let Some(&next) = chars.peek() {
                if next == '{' || next.is_alphanumeric() || next == '_' {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoscribe_protocol::HistoryPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_expand_env_string_with_braces() {
        env::set_var("PROTOSCRIBE_TEST_MODEL", "gpt-test");
        let result = expand_env_string("ft:${PROTOSCRIBE_TEST_MODEL}:suffix");
        assert_eq!(result.value, "ft:gpt-test:suffix");
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_expand_env_string_without_braces() {
        env::set_var("PROTOSCRIBE_TEST_HOST", "localhost");
        let result = expand_env_string("http://$PROTOSCRIBE_TEST_HOST:8080");
        assert_eq!(result.value, "http://localhost:8080");
    }

    #[test]
    fn test_expand_env_string_missing_var() {
        let result = expand_env_string_with("${PROTOSCRIBE_NONEXISTENT_VAR}", |_| None);
        assert_eq!(result.value, "${PROTOSCRIBE_NONEXISTENT_VAR}");
        assert_eq!(result.unresolved, ["PROTOSCRIBE_NONEXISTENT_VAR"]);
    }

    #[test]
    fn test_expand_env_string_reports_every_unset_var() {
        let lookup = |name: &str| (name == "SET").then(|| "x".to_string());
        let result = expand_env_string_with("sk-${UNSET_A}-$SET-$UNSET_B", lookup);
        assert_eq!(result.value, "sk-${UNSET_A}-x-$UNSET_B");
        assert_eq!(result.unresolved, ["UNSET_A", "UNSET_B"]);
    }

    #[test]
    fn test_has_env_reference() {
        assert!(has_env_reference("$OPENAI_API_KEY"));
        assert!(has_env_reference("sk-${UNSET}"));
        assert!(!has_env_reference("sk-proj-abc"));
        assert!(!has_env_reference("costs $ 5"));
    }

    #[test]
    fn test_expand_env_string_lone_dollar() {
        let result = expand_env_string("costs $ 5");
        assert_eq!(result.value, "costs $ 5");
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("protoscribe.jsonc")),
            Some(ConfigFormat::Jsonc)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("protoscribe.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("protoscribe.yaml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("protoscribe.toml")), None);
    }

    #[test]
    fn test_config_priority_order() {
        assert_eq!(CONFIG_CANDIDATES[0], "protoscribe.jsonc");
        assert_eq!(CONFIG_CANDIDATES[1], "protoscribe.json");
        assert_eq!(CONFIG_CANDIDATES[2], "protoscribe.yml");
        assert_eq!(CONFIG_CANDIDATES[3], "protoscribe.yaml");
        assert_eq!(CONFIG_CANDIDATES[4], ".protoscribe.jsonc");
    }

    #[test]
    fn test_load_jsonc_with_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("protoscribe.jsonc");
        let content = r#"{
  // refinement runs on the general model
  "models": { "refinement": "gpt-4o" },
  /* block comment */
  "generation": { "length_limit": 2000 }
}"#;
        fs::write(&path, content).unwrap();

        let resolved = load_config_from_file(&path).unwrap();
        assert_eq!(resolved.format, Some(ConfigFormat::Jsonc));
        assert_eq!(resolved.config.models.refinement, "gpt-4o");
        assert_eq!(resolved.config.generation.length_limit, 2000);
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("protoscribe.yml");
        let content = r#"
provider:
  base_url: http://localhost:9000
  timeout_secs: 30
generation:
  temperature: 1.1
  deidentify: false
  history_policy: after_draft
telemetry:
  level: debug
  json_output: true
"#;
        fs::write(&path, content).unwrap();

        let config = load_config_from_file(&path).unwrap().config;
        assert_eq!(config.provider.base_url, "http://localhost:9000");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.generation.temperature, 1.1);
        assert!(!config.generation.deidentify);
        assert_eq!(config.generation.history_policy, HistoryPolicy::AfterDraft);
        assert!(config.telemetry.json_output);
    }

    #[test]
    fn test_api_key_is_expanded_from_env() {
        env::set_var("PROTOSCRIBE_TEST_KEY", "sk-from-env");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("protoscribe.json");
        fs::write(
            &path,
            r#"{"provider": {"api_key": "${PROTOSCRIBE_TEST_KEY}"}}"#,
        )
        .unwrap();

        let config = load_config_from_file(&path).unwrap().config;
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-from-env"));
    }

    #[test]
    fn test_api_key_with_unset_bare_var_is_absent() {
        env::remove_var("PROTOSCRIBE_UNSET_KEY_BARE");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("protoscribe.yaml");
        fs::write(&path, "provider:\n  api_key: $PROTOSCRIBE_UNSET_KEY_BARE\n").unwrap();

        let config = load_config_from_file(&path).unwrap().config;
        assert_eq!(config.provider.api_key, None);
        assert!(matches!(
            config.resolve_api_key_with(|_| None),
            Err(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_api_key_with_embedded_unset_var_is_absent() {
        env::remove_var("PROTOSCRIBE_UNSET_KEY_EMBEDDED");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("protoscribe.json");
        fs::write(
            &path,
            r#"{"provider": {"api_key": "sk-${PROTOSCRIBE_UNSET_KEY_EMBEDDED}"}}"#,
        )
        .unwrap();

        let config = load_config_from_file(&path).unwrap().config;
        assert_eq!(config.provider.api_key, None);
        let key = config
            .resolve_api_key_with(|_| Some("sk-env".to_string()))
            .unwrap();
        assert_eq!(secrecy::ExposeSecret::expose_secret(&key), "sk-env");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("protoscribe.toml");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            load_config_from_file(&path),
            Err(ConfigError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("protoscribe.json");
        fs::write(&path, "{ not json").unwrap();
        match load_config_from_file(&path) {
            Err(ConfigError::Parse { format, .. }) => assert_eq!(format, "JSON"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_missing_explicit_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(matches!(
            resolve_config(Some(&path)),
            Err(ConfigError::Read { .. })
        ));
    }
}
