use serde::Deserialize;
use std::time::Duration;

/// LabKey `selectRows` endpoint for the participant identifier query.
pub const DEFAULT_BASE_URL: &str = "https://gmc.genomicsengland.nhs.uk/labkey/query/Genomics England Portal/South London/MeRCURy/Rare Diseases/Core/selectRows.api";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            base_url: match lookup("LABKEY_BASE_URL").filter(|s| !s.trim().is_empty()) {
                Some(url) => {
                    let parsed = url::Url::parse(&url).map_err(|e| {
                        anyhow::anyhow!("LABKEY_BASE_URL is not a valid URL: {}", e)
                    })?;
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        anyhow::bail!("LABKEY_BASE_URL must start with http:// or https://");
                    }
                    url
                }
                None => DEFAULT_BASE_URL.to_string(),
            },
            timeout_secs: match lookup("LABKEY_TIMEOUT_SECS") {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("LABKEY_TIMEOUT_SECS must be a positive number of seconds")
                    })?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };

        tracing::debug!("LabKey endpoint: {}", config.base_url);
        tracing::debug!("Request timeout: {}s", config.timeout_secs);

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
