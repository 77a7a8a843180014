use crate::services::RiskModel;
use crate::types::dto::common::HealthResponse;
use chrono::Utc;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Health check API
pub struct HealthApi {
    risk_model: Arc<RiskModel>,
}

impl HealthApi {
    pub fn new(risk_model: Arc<RiskModel>) -> Self {
        Self { risk_model }
    }
}

/// API tags for health endpoints
#[derive(Tags)]
enum ApiTags {
    /// Health check endpoints
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    ///
    /// Returns the current status of the API service, including whether the
    /// risk classifier is serving genuine predictions or the flagged fallback
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            model_available: self.risk_model.is_available(),
        })
    }
}
