use crate::domain::signals::PaymentProvider;
use crate::error::{QrError, Result};
use crate::infrastructure::ip_api::DEFAULT_BASE_URL;
use std::time::Duration;

/// Runtime settings for the scan pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub geo_enabled: bool,
    pub geo_url: String,
    pub geo_timeout: Duration,
    pub default_provider: Option<PaymentProvider>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geo_enabled: true,
            geo_url: DEFAULT_BASE_URL.to_string(),
            geo_timeout: Duration::from_millis(1500),
            default_provider: None,
            log_level: "info".to_string(),
        }
    }
}

/// Load settings from the environment, reading a `.env` file first if present.
///
/// # Errors
///
/// Returns [`QrError::Config`] if a variable is set to an invalid value.
pub fn load_settings() -> Result<Settings> {
    dotenvy::dotenv().ok();
    build_settings(|key| std::env::var(key))
}

/// Parse settings through `lookup` so tests never touch the process env.
fn build_settings<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
{
    let defaults = Settings::default();
    let invalid = |var: &str, reason: String| QrError::Config {
        var: var.to_string(),
        reason,
    };
    let present = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

    let geo_enabled = match present("QRMUX_GEO_ENABLED") {
        Some(raw) => parse_bool(&raw)
            .ok_or_else(|| invalid("QRMUX_GEO_ENABLED", format!("expected a boolean, got '{raw}'")))?,
        None => defaults.geo_enabled,
    };

    let geo_url = present("QRMUX_GEO_URL").unwrap_or(defaults.geo_url);

    let geo_timeout = match present("QRMUX_GEO_TIMEOUT_MS") {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| invalid("QRMUX_GEO_TIMEOUT_MS", e.to_string()))?,
        None => defaults.geo_timeout,
    };

    let default_provider = present("QRMUX_DEFAULT_PROVIDER")
        .map(|raw| raw.parse::<PaymentProvider>())
        .transpose()
        .map_err(|reason| invalid("QRMUX_DEFAULT_PROVIDER", reason))?;

    let log_level = present("QRMUX_LOG_LEVEL").unwrap_or(defaults.log_level);

    Ok(Settings {
        geo_enabled,
        geo_url,
        geo_timeout,
        default_provider,
        log_level,
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
