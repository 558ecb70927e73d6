use crate::config::Config;
use crate::errors::FetchError;
use crate::models::{Query, Record};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for the LabKey `selectRows` API.
///
/// Each lookup is a single GET; nothing is cached or retried.
#[derive(Clone)]
pub struct LabKeyClient {
    client: reqwest::Client,
    base_url: String,
}

impl LabKeyClient {
    /// Creates a new `LabKeyClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Full URL of the `selectRows.api` endpoint.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                FetchError::TransportError(format!("Failed to create LabKey client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Looks up one participant.
    ///
    /// # Returns
    ///
    /// * `Result<Record, FetchError>` - The reshaped row, or the first failure.
    pub async fn fetch(&self, query: &Query) -> Result<Record, FetchError> {
        let raw = self.select_rows(query).await?;
        let row_count = raw.get("rowCount").and_then(Value::as_i64);
        tracing::debug!(
            "LabKey returned rowCount {:?} for participant {}",
            row_count,
            query.identifier()
        );

        Record::from_response(query.identifier(), raw).map_err(|e| {
            tracing::warn!("Lookup of participant {} failed: {}", query.identifier(), e);
            e
        })
    }

    /// Issues the GET and returns the parsed JSON body.
    async fn select_rows(&self, query: &Query) -> Result<Value, FetchError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(&self.base_url, query.params())
            .map_err(|e| FetchError::TransportError(format!("Failed to build URL: {}", e)))?;

        tracing::info!(
            "Fetching participant {} from LabKey (authenticated: {})",
            query.identifier(),
            query.credentials().is_some()
        );

        let mut request = self.client.get(url);
        if let Some(credentials) = query.credentials() {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::TransportError(format!("LabKey request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!("LabKey rejected credentials with {}", status);
            return Err(FetchError::AuthError {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("LabKey returned error {}: {}", status, error_text);
            return Err(FetchError::TransportError(format!(
                "LabKey returned {}: {}",
                status, error_text
            )));
        }

        let data = response.json().await.map_err(|e| {
            FetchError::TransportError(format!("Failed to parse LabKey response: {}", e))
        })?;

        Ok(data)
    }
}
