use crate::errors::{AppError, ResultExt};
use crate::lead_models::CrmRecord;
use axum::http::StatusCode;

/// Client for the Bitrix24 inbound webhook (`crm.lead.add`).
///
/// Uses reqwest's defaults: no request timeout, no retries.
#[derive(Clone)]
pub struct BitrixClient {
    client: reqwest::Client,
    webhook_url: String,
}

/// Reply from Bitrix24, relayed to the caller as-is.
#[derive(Debug, Clone)]
pub struct BitrixResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl BitrixClient {
    /// Creates a new `BitrixClient`.
    ///
    /// # Arguments
    ///
    /// * `webhook_url` - Full inbound webhook URL, secret path included.
    pub fn new(webhook_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create Bitrix24 client: {}", e))
            })?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Posts a lead record to Bitrix24.
    ///
    /// Any HTTP status counts as a completed call; the body must be JSON.
    ///
    /// # Returns
    ///
    /// * `Result<BitrixResponse, AppError>` - Status and parsed body, or a transport/parse error.
    pub async fn create_lead(&self, record: &CrmRecord) -> Result<BitrixResponse, AppError> {
        tracing::debug!("Posting lead '{}' to Bitrix24", record.fields.title);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(record)
            .send()
            .await
            .context("Bitrix24 request failed")?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Bitrix24 answered with status {}", status);
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse Bitrix24 response")?;

        Ok(BitrixResponse { status, body })
    }
}
