//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.pvscope/config.json`) and environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::router::Unmatched;

/// Base URL of the inspection service used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://cdxq.wkdkckdcx.cn:30443";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Remote inspection service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// View routing settings.
    #[serde(default)]
    pub router: RouterConfig,
}

/// Remote service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Origin every gateway request is sent to. Overridden by PVSCOPE_API_URL env.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

/// Router settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// What to show for a path outside the declared routes: "notFound" or
    /// `{ "redirect": "/fault-detection" }`. Defaults to "notFound", which renders no view,
    /// matching a web router with no catch-all route.
    #[serde(default)]
    pub unmatched: Unmatched,
}

/// Resolve the API base URL: an explicit override (e.g. `--base-url`) wins, then env PVSCOPE_API_URL,
/// then config. Blank values are ignored and trailing slashes are trimmed.
pub fn resolve_api_base_url(config: &Config, override_url: Option<&str>) -> String {
    let env = std::env::var("PVSCOPE_API_URL").ok();
    resolve_api_base_url_from(override_url, env.as_deref(), config)
}

fn resolve_api_base_url_from(
    override_url: Option<&str>,
    env: Option<&str>,
    config: &Config,
) -> String {
    [override_url, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| config.api.base_url.trim())
        .trim_end_matches('/')
        .to_string()
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PVSCOPE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".pvscope").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or PVSCOPE_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_api_base_url_and_unmatched() {
        let c = Config::default();
        assert_eq!(c.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(c.router.unmatched, Unmatched::NotFound);
    }

    #[test]
    fn parse_empty_object_uses_defaults() {
        let c: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(c.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(c.router.unmatched, Unmatched::NotFound);
    }

    #[test]
    fn parse_camel_case_and_redirect_fallback() {
        let c: Config = serde_json::from_str(
            r#"{ "api": { "baseUrl": "http://127.0.0.1:9000/" },
                 "router": { "unmatched": { "redirect": "/fault-detection" } } }"#,
        )
        .unwrap();
        assert_eq!(c.api.base_url, "http://127.0.0.1:9000/");
        assert_eq!(
            c.router.unmatched,
            Unmatched::Redirect("/fault-detection".to_string())
        );
    }

    fn config_with_base_url(url: &str) -> Config {
        let mut config = Config::default();
        config.api.base_url = url.to_string();
        config
    }

    #[test]
    fn resolve_api_base_url_env_overrides_config() {
        let config = config_with_base_url(" http://cfg:1/ ");
        assert_eq!(
            resolve_api_base_url_from(None, Some("http://env:2//"), &config),
            "http://env:2"
        );
    }

    #[test]
    fn resolve_api_base_url_blank_env_falls_back_to_config() {
        let config = config_with_base_url(" http://cfg:1/ ");
        assert_eq!(resolve_api_base_url_from(None, Some("   "), &config), "http://cfg:1");
        assert_eq!(resolve_api_base_url_from(None, None, &config), "http://cfg:1");
    }

    #[test]
    fn resolve_api_base_url_override_beats_env() {
        let config = config_with_base_url("http://cfg:1");
        assert_eq!(
            resolve_api_base_url_from(Some("http://flag:3/"), Some("http://env:2"), &config),
            "http://flag:3"
        );
        assert_eq!(
            resolve_api_base_url_from(Some(" "), Some("http://env:2"), &config),
            "http://env:2"
        );
    }

    #[test]
    fn load_missing_file_is_default() {
        let path = std::env::temp_dir().join("pvscope-config-test-does-not-exist.json");
        let (c, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(c.api.base_url, DEFAULT_API_BASE_URL);
    }
}
