//! Configuration and shared constants
//!
//! The inference credential is read at runtime and never compiled into the
//! binary.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-2-1";

/// Suggested filename for the download affordance.
pub const DOWNLOAD_FILENAME: &str = "generated-image.png";

#[derive(Clone)]
pub struct Config {
    pub api_token: String,
    pub endpoint: String,
    pub request_timeout: Option<Duration>,
    pub output_dir: PathBuf,
}

// Keeps the token out of logs and panic messages.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup("HF_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| crate::Error::Config("HF_API_TOKEN not set".to_string()))?;

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    crate::Error::Config(format!(
                        "Invalid REQUEST_TIMEOUT_SECS '{}': expected whole seconds",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_token,
            endpoint: lookup("INFERENCE_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout,
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
        })
    }
}
