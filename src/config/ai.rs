// src/config/ai.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

pub const ENV_AI_CONFIG_PATH: &str = "AI_CONFIG_PATH";
pub const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";

/// Items sent to the enrichment call at most.
pub const MAX_PROMPT_ITEMS: usize = 25;

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_items() -> usize {
    MAX_PROMPT_ITEMS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "gemini" | "openai" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// "ENV" means: read from GOOGLE_API_KEY / OPENAI_API_KEY (by provider)
    #[serde(default)]
    pub api_key: String,
    /// Model override; provider default when absent.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Hits embedded in the prompt (1..=25).
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            api_key: String::new(),
            model: None,
            timeout_secs: default_timeout_secs(),
            max_items: default_max_items(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading AI config from {}", path.display()))?;
        let cfg: AiConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing AI config {}", path.display()))?;
        Ok(cfg.resolved())
    }

    /// Lookup order: `$AI_CONFIG_PATH`, `config/ai.json`, then environment only
    /// (enabled with Gemini when `GOOGLE_API_KEY` is set).
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_AI_CONFIG_PATH) {
            return Self::load_from_file(PathBuf::from(p));
        }
        let default_path = Path::new(DEFAULT_AI_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from_file(default_path);
        }
        Ok(Self::from_env())
    }

    /// Config derived from process environment alone.
    pub fn from_env() -> Self {
        let cfg = Self {
            enabled: env::var("GOOGLE_API_KEY").is_ok_and(|k| !k.trim().is_empty()),
            api_key: "ENV".to_string(),
            ..Self::default()
        };
        cfg.resolved()
    }

    /// Normalize provider, resolve "ENV" keys and sanitize limits.
    /// A missing credential leaves `api_key` empty; the caller then runs
    /// without enrichment.
    pub fn resolved(mut self) -> Self {
        self.provider = self.provider.trim().to_lowercase();

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            let var = match self.provider.as_str() {
                "openai" => Some("OPENAI_API_KEY"),
                "gemini" => Some("GOOGLE_API_KEY"),
                _ => None,
            };
            self.api_key = var.and_then(|v| env::var(v).ok()).unwrap_or_default();
            if self.enabled && self.api_key.is_empty() {
                warn!(
                    target: "config",
                    provider = %self.provider,
                    "AI enabled but no credential in environment; enrichment disabled"
                );
            }
        }

        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        self.max_items = self.max_items.clamp(1, MAX_PROMPT_ITEMS);

        // Safe diagnostics: only provider + enabled + key length
        info!(
            target: "config",
            "AI cfg: provider={}, enabled={}, key_len={}",
            self.provider,
            self.enabled,
            self.api_key.len()
        );
        self
    }

    /// Enrichment is attempted only when enabled and a credential is present.
    pub fn is_available(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn env_key_resolution_and_availability() {
        env::set_var("OPENAI_API_KEY", "sk-test");
        let cfg: AiConfig =
            serde_json::from_str(r#"{"enabled":true,"provider":" OpenAI ","api_key":"env"}"#)
                .unwrap();
        let cfg = cfg.resolved();
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.api_key, "sk-test");
        assert!(cfg.is_available());
        env::remove_var("OPENAI_API_KEY");

        let cfg: AiConfig =
            serde_json::from_str(r#"{"enabled":true,"provider":"openai","api_key":"ENV"}"#)
                .unwrap();
        assert!(!cfg.resolved().is_available());
    }

    #[test]
    fn limits_are_sanitized() {
        let cfg: AiConfig = serde_json::from_str(
            r#"{"enabled":false,"api_key":"k","timeout_secs":0,"max_items":500}"#,
        )
        .unwrap();
        let cfg = cfg.resolved();
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_items, MAX_PROMPT_ITEMS);
        assert!(!cfg.is_available(), "disabled config is never available");
    }

    #[serial_test::serial]
    #[test]
    fn from_env_follows_google_key() {
        env::remove_var("GOOGLE_API_KEY");
        assert!(!AiConfig::from_env().is_available());
        env::set_var("GOOGLE_API_KEY", "g-key");
        let cfg = AiConfig::from_env();
        assert!(cfg.is_available());
        assert_eq!(cfg.provider, "gemini");
        env::remove_var("GOOGLE_API_KEY");
    }
}
