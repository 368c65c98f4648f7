//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.imagine/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::Provider;
use crate::generation::preload::DEFAULT_MAX_IMAGE_BYTES;
use crate::generation::providers::endpoint::DEFAULT_ENDPOINT_URL;
use crate::generation::providers::openai::{
    DEFAULT_IMAGE_SIZE, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ImagineConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<Provider>,
    pub request_timeout_secs: Option<u64>,
    pub max_image_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
}

// ============================================================================
// Resolved Config (concrete values)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: Provider,
    /// `None` leaves a hung request pending indefinitely.
    pub request_timeout: Option<Duration>,
    pub max_image_bytes: usize,
    pub endpoint_url: String,
    pub endpoint_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_size: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing credential: set {0} or add it to the config file")]
    MissingCredential(&'static str),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.imagine/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".imagine").join("config.toml"))
}

/// Load config from `~/.imagine/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ImagineConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ImagineConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ImagineConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<ImagineConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ImagineConfig::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: ImagineConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view of the config with secrets masked.
fn redacted(config: &ImagineConfig) -> String {
    format!(
        "provider={:?}, timeout={:?}, endpoint={:?}, endpoint_key={}, openai_key={}, openai_model={:?}",
        config.general.default_provider,
        config.general.request_timeout_secs,
        config.endpoint.url,
        config.endpoint.api_key.is_some(),
        config.openai.api_key.is_some(),
        config.openai.model,
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Imagine Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "endpoint"      # "endpoint" or "openai"
# request_timeout_secs = 120         # unset = wait indefinitely
# max_image_bytes = 33554432

# [endpoint]
# url = "http://localhost:3000/api/generate"   # Or set IMAGINE_ENDPOINT_URL
# api_key = "..."                              # Or set IMAGINE_ENDPOINT_API_KEY

# [openai]
# api_key = "sk-..."                 # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"
# model = "dall-e-3"                # dall-e-* only; others return no URL
# size = "1024x1024"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ImagineConfig, cli_provider: Option<Provider>) -> ResolvedConfig {
    resolve_with(config, cli_provider, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with(
    config: &ImagineConfig,
    cli_provider: Option<Provider>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider = cli_provider
        .or_else(|| {
            env("IMAGINE_PROVIDER").and_then(|s| match Provider::from_str(&s, true) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Ignoring IMAGINE_PROVIDER={}: {}", s, e);
                    None
                }
            })
        })
        .or(config.general.default_provider)
        .unwrap_or_default();

    let request_timeout = env("IMAGINE_TIMEOUT_SECS")
        .and_then(|s| s.parse::<u64>().ok())
        .or(config.general.request_timeout_secs)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let endpoint_url = env("IMAGINE_ENDPOINT_URL")
        .or_else(|| config.endpoint.url.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string());

    let endpoint_api_key =
        env("IMAGINE_ENDPOINT_API_KEY").or_else(|| config.endpoint.api_key.clone());

    let openai_api_key = env("OPENAI_API_KEY").or_else(|| config.openai.api_key.clone());

    let openai_base_url = env("OPENAI_BASE_URL")
        .or_else(|| config.openai.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    ResolvedConfig {
        provider,
        request_timeout,
        max_image_bytes: config
            .general
            .max_image_bytes
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
        endpoint_url,
        endpoint_api_key,
        openai_api_key,
        openai_base_url,
        openai_model: config
            .openai
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        openai_size: config
            .openai
            .size
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&ImagineConfig::default(), None, no_env);
        assert_eq!(resolved.provider, Provider::Endpoint);
        assert_eq!(resolved.request_timeout, None);
        assert_eq!(resolved.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
        assert_eq!(resolved.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(resolved.openai_model, DEFAULT_OPENAI_MODEL);
        assert!(resolved.openai_api_key.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ImagineConfig {
            general: GeneralConfig {
                default_provider: Some(Provider::OpenAi),
                request_timeout_secs: Some(90),
                max_image_bytes: Some(1024),
            },
            openai: OpenAiConfig {
                api_key: Some("sk-file".into()),
                model: Some("dall-e-2".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with(&config, None, no_env);
        assert_eq!(resolved.provider, Provider::OpenAi);
        assert_eq!(resolved.request_timeout, Some(Duration::from_secs(90)));
        assert_eq!(resolved.max_image_bytes, 1024);
        assert_eq!(resolved.openai_api_key.as_deref(), Some("sk-file"));
        assert_eq!(resolved.openai_model, "dall-e-2");
    }

    #[test]
    fn test_env_wins_over_file_and_cli_wins_over_env() {
        let config = ImagineConfig {
            general: GeneralConfig {
                default_provider: Some(Provider::Endpoint),
                ..Default::default()
            },
            endpoint: EndpointConfig {
                url: Some("http://file/gen".into()),
                api_key: None,
            },
            ..Default::default()
        };
        let env: HashMap<&str, &str> = HashMap::from([
            ("IMAGINE_PROVIDER", "openai"),
            ("IMAGINE_ENDPOINT_URL", "http://env/gen"),
            ("IMAGINE_TIMEOUT_SECS", "5"),
        ]);
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        let resolved = resolve_with(&config, None, lookup);
        assert_eq!(resolved.provider, Provider::OpenAi);
        assert_eq!(resolved.endpoint_url, "http://env/gen");
        assert_eq!(resolved.request_timeout, Some(Duration::from_secs(5)));

        let resolved = resolve_with(&config, Some(Provider::Endpoint), lookup);
        assert_eq!(resolved.provider, Provider::Endpoint);
    }

    #[test]
    fn test_zero_timeout_means_no_timeout() {
        let config = ImagineConfig {
            general: GeneralConfig {
                request_timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_with(&config, None, no_env).request_timeout, None);
    }

    #[test]
    fn test_invalid_env_provider_is_ignored() {
        let lookup = |k: &str| (k == "IMAGINE_PROVIDER").then(|| "dalle".to_string());
        let resolved = resolve_with(&ImagineConfig::default(), None, lookup);
        assert_eq!(resolved.provider, Provider::Endpoint);
    }

    #[test]
    fn test_toml_parses() {
        let toml_str = r#"
[general]
default_provider = "openai"
request_timeout_secs = 30

[endpoint]
url = "http://192.168.1.100:3000/api/generate"

[openai]
api_key = "sk-test-123"
size = "1792x1024"
"#;
        let config: ImagineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.default_provider, Some(Provider::OpenAi));
        assert_eq!(config.general.request_timeout_secs, Some(30));
        assert_eq!(
            config.endpoint.url.as_deref(),
            Some("http://192.168.1.100:3000/api/generate")
        );
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test-123"));
        assert_eq!(config.openai.size.as_deref(), Some("1792x1024"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[openai]
model = "my-model"
"#;
        let config: ImagineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.openai.model.as_deref(), Some("my-model"));
        assert!(config.general.default_provider.is_none());
        assert!(config.endpoint.url.is_none());
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = std::env::temp_dir().join(format!("imagine-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(config.general.default_provider.is_none());

        // The generated file is all comments, so it parses back to defaults
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.endpoint.url.is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("imagine-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[general\nbroken").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let _ = fs::remove_dir_all(dir);
    }
}
