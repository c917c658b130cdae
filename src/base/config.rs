//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::Res;

/// Default OpenAI model to use for classification
fn default_openai_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Default sampling temperature for the classifier
fn default_openai_temperature() -> f32 {
    0.0
}

/// Default max output tokens for the classifier reply
fn default_openai_max_tokens() -> u32 {
    256
}

/// Default system directive for the classifier.
fn default_classifier_system_directive() -> String {
    prompts::CLASSIFIER_SYSTEM_DIRECTIVE.to_string()
}

/// Default path of the SQLite ticket database.
fn default_db_path() -> String {
    "tickets.db".to_string()
}

/// Default HTTP listen address.
fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Configuration for the triage-desk application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).  Required: a missing key fails
    /// startup instead of silently disabling classification.
    pub openai_api_key: String,
    /// OpenAI model to use for classification (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Optional custom system directive to override the default (`CLASSIFIER_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_classifier_system_directive")]
    pub classifier_system_directive: String,
    /// Sampling temperature to use for the classifier model (`OPENAI_TEMPERATURE`).
    /// Value between 0 and 2. Higher values like 0.8 make output more random,
    /// while lower values like 0.2 make it more focused and deterministic.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Max output tokens for the classifier reply (`OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Path of the SQLite ticket database (`DB_PATH`).
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Address the HTTP server binds to (`LISTEN_ADDR`).
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("TRIAGE_DESK"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.openai_temperature < 0.0 || result.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if result.openai_max_tokens < 1 || result.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_in() {
        let inner: ConfigInner = serde_json::from_value(serde_json::json!({
            "openai_api_key": "test_key",
        }))
        .unwrap();

        assert_eq!(inner.openai_model, "gpt-4.1-mini");
        assert_eq!(inner.openai_temperature, 0.0);
        assert_eq!(inner.openai_max_tokens, 256);
        assert_eq!(inner.db_path, "tickets.db");
        assert_eq!(inner.listen_addr, "127.0.0.1:8080");
        assert!(inner.classifier_system_directive.contains("ALLOWED CATEGORIES"));
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let result = serde_json::from_value::<ConfigInner>(serde_json::json!({}));

        assert!(result.is_err());
    }
}
