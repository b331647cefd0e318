//! Configuration loading and validation for Reagent.
//!
//! All configuration comes from environment variables; every setting
//! has a default except the OpenAI API key, which is validated where it
//! is actually needed rather than at load time so offline commands keep
//! working without one.

use std::fmt;

/// The root configuration structure.
#[derive(Clone)]
pub struct AppConfig {
    /// Gateway bind host
    pub host: String,

    /// Gateway bind port
    pub port: u16,

    /// OpenAI-compatible API key (`OPENAI_API_KEY`)
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Model used for both the agent chain and code generation
    pub model: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8787
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "api_key",
                &match self.api_key {
                    Some(_) => "[REDACTED]",
                    None => "None",
                },
            )
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Recognized variables: `REAGENT_HOST`, `REAGENT_PORT`,
    /// `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `REAGENT_MODEL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("REAGENT_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "REAGENT_PORT",
                reason: format!("{raw:?} is not a valid port number"),
            })?,
            None => default_port(),
        };

        let config = Self {
            host: lookup("REAGENT_HOST").unwrap_or_else(default_host),
            port,
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(default_base_url),
            model: lookup("REAGENT_MODEL").unwrap_or_else(default_model),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid {
                name: "REAGENT_HOST",
                reason: "must not be empty".into(),
            });
        }
        if self.model.is_empty() {
            return Err(ConfigError::Invalid {
                name: "REAGENT_MODEL",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// The socket address the gateway binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The API key, or an error naming the missing variable.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing { name: "OPENAI_API_KEY" })
    }

    /// Check if an API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Required environment variable {name} is not set")]
    Missing { name: &'static str },

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
