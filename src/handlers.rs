use crate::bitrix_client::BitrixClient;
use crate::config::Config;
use crate::errors::AppError;
use crate::lead_models::InboundLead;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the Bitrix24 inbound webhook.
    pub bitrix: BitrixClient,
}

/// GET /
///
/// Plain-text liveness message.
pub async fn home() -> &'static str {
    "✅ Collect.chat → Bitrix24 relay is running!"
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /collectchat
///
/// Receives a Collect.chat lead (JSON or form-encoded), maps it to a Bitrix24
/// lead and forwards it. Bitrix24's status code and JSON body are relayed
/// back, whatever the status.
///
/// # Returns
///
/// * `Result<(StatusCode, Json<Value>), AppError>` - Relay summary, or 400 when
///   no data was sent, 413 when the body exceeds the size limit, or 500 on
///   any mapping/transport fault.
pub async fn collectchat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let body = body?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let lead = InboundLead::extract(content_type, &body)?;
    let received = Value::Object(lead.raw().clone());
    tracing::info!("📩 Received from Collect.chat: {}", received);

    let record = state
        .config
        .lead_mapping
        .build_record(&lead, &state.config.mapping_settings);

    let bitrix_response = state.bitrix.create_lead(&record).await?;
    tracing::info!(
        "Bitrix24 response ({}): {}",
        bitrix_response.status,
        bitrix_response.body
    );

    let mut summary = Map::new();
    summary.insert("status".to_string(), json!("success"));
    if state.config.lead_mapping.echoes_payload() {
        summary.insert("data_received".to_string(), received);
    }
    summary.insert("bitrix_response".to_string(), bitrix_response.body);

    Ok((bitrix_response.status, Json(Value::Object(summary))))
}
