use anyhow::{Context, Result};
use url::Url;

use crate::model::ModelVariant;
use crate::notice::DismissPolicy;

pub const DEFAULT_API_URL: &str = "https://f1-pitstrategy-optimizer-production.up.railway.app";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
    pub request_timeout_ms: u64,
    pub health_timeout_ms: u64,
    pub notice_dismiss_ms: u64,
    pub notice_policy: DismissPolicy,
    pub export_dir: String,
    pub default_model: ModelVariant,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let raw_url = std::env::var("PITWALL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Ok(Self {
            api_url: parse_base_url(&raw_url)?,
            request_timeout_ms: std::env::var("PITWALL_REQUEST_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(30_000),
            health_timeout_ms: std::env::var("PITWALL_HEALTH_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(5_000),
            notice_dismiss_ms: std::env::var("PITWALL_NOTICE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(5_000),
            notice_policy: std::env::var("PITWALL_NOTICE_POLICY").ok().and_then(|v| v.parse().ok()).unwrap_or_default(),
            export_dir: std::env::var("PITWALL_EXPORT_DIR").unwrap_or_else(|_| ".".to_string()),
            default_model: std::env::var("PITWALL_MODEL").ok().and_then(|v| v.parse().ok()).unwrap_or_default(),
        })
    }

    /// Config pointing at `base`, every other field at its default.
    pub fn with_base(base: &str) -> Result<Self> {
        Ok(Self {
            api_url: parse_base_url(base)?,
            request_timeout_ms: 30_000,
            health_timeout_ms: 5_000,
            notice_dismiss_ms: 5_000,
            notice_policy: DismissPolicy::default(),
            export_dir: ".".to_string(),
            default_model: ModelVariant::default(),
        })
    }

    /// `{service}/<path>`; the base path is kept even without a trailing slash.
    pub fn api_endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("cannot join {} onto {}", path, self.api_url))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid PITWALL_API_URL: {}", raw))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
