//! API request handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::neo4j::models::{ChartType, ChartTypeNode, RelationshipChartNode};
use crate::synthesis::{
    ChartSynthesizer, EntityRole, PairRequest, PropagationSummary, SynthesisError,
};

/// Shared server state
pub struct ServerState {
    pub synthesizer: Arc<ChartSynthesizer>,
}

/// Shared synthesis state
pub type SynthesisState = Arc<ServerState>;

// ============================================================================
// Health check
// ============================================================================

/// Per-service health status in the health response
#[derive(Serialize)]
pub struct ServiceHealthStatus {
    pub neo4j: String,
    pub engine: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealthStatus,
}

/// Health check handler that verifies actual connectivity to Neo4j and the
/// computation engine.
///
/// Returns:
/// - 200 + `"ok"` if both are reachable
/// - 200 + `"degraded"` if Neo4j is reachable but the engine is not
///   (existing charts still serve from cache/store)
/// - 503 + `"unhealthy"` if Neo4j is unreachable (critical dependency)
pub async fn health(State(state): State<SynthesisState>) -> (StatusCode, Json<HealthResponse>) {
    let neo4j_ok = state
        .synthesizer
        .store()
        .health_check()
        .await
        .unwrap_or(false);
    let engine_ok = state.synthesizer.engine().health_check().await;

    let status = if neo4j_ok && engine_ok {
        "ok"
    } else if neo4j_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    let code = if neo4j_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let connectivity = |ok: bool| if ok { "connected" } else { "disconnected" };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealthStatus {
                neo4j: connectivity(neo4j_ok).to_string(),
                engine: connectivity(engine_ok).to_string(),
            },
        }),
    )
}

// ============================================================================
// Chart types
// ============================================================================

/// List chart-type reference data
pub async fn list_chart_types(
    State(state): State<SynthesisState>,
) -> Result<Json<Vec<ChartTypeNode>>, AppError> {
    let types = state.synthesizer.store().list_chart_types().await?;
    Ok(Json(types))
}

// ============================================================================
// Relationship charts
// ============================================================================

/// Request body for the get-or-create endpoint: a chart type plus exactly
/// two of the three role ids
#[derive(Debug, Deserialize)]
pub struct CreateChartRequest {
    pub chart_type_id: i64,
    #[serde(flatten)]
    pub pair: PairRequest,
}

/// Get-or-create a relationship chart.
///
/// 201 with the chart when this request computed it, 200 when it already
/// existed in cache or store.
pub async fn create_chart(
    State(state): State<SynthesisState>,
    Json(req): Json<CreateChartRequest>,
) -> Result<(StatusCode, Json<RelationshipChartNode>), AppError> {
    let chart_type = ChartType::from_id(req.chart_type_id).ok_or_else(|| {
        AppError::BadRequest(format!("unsupported chart type id: {}", req.chart_type_id))
    })?;

    let outcome = state.synthesizer.get_or_create(chart_type, &req.pair).await?;

    let code = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((code, Json(outcome.chart)))
}

/// Request body for update propagation, sent by the profile layer after it
/// persists a change to a person/associate/organization record
#[derive(Debug, Deserialize)]
pub struct PropagateRequest {
    pub entity_id: String,
    pub role: EntityRole,
}

/// Recompute every chart referencing a changed entity (best-effort).
///
/// Always 200 with sweep counts; individual stale charts are logged, never
/// surfaced as request failures.
pub async fn propagate_update(
    State(state): State<SynthesisState>,
    Json(req): Json<PropagateRequest>,
) -> Result<Json<PropagationSummary>, AppError> {
    let summary = state
        .synthesizer
        .propagate_update(&req.entity_id, req.role)
        .await?;
    Ok(Json(summary))
}

// ============================================================================
// Error mapping
// ============================================================================

pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::InvalidCombination => AppError::BadRequest(err.to_string()),
            SynthesisError::EntityNotFound { .. } => AppError::NotFound(err.to_string()),
            SynthesisError::Computation(e) => AppError::BadGateway(e.to_string()),
            SynthesisError::Store(e) | SynthesisError::Cache(e) => AppError::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_chart_request_flattens_role_ids() {
        let json = r#"{"chart_type_id":25,"person_id":"p1","associate_id":"a1"}"#;
        let req: CreateChartRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.chart_type_id, 25);
        assert_eq!(req.pair.person_id, Some("p1".to_string()));
        assert_eq!(req.pair.associate_id, Some("a1".to_string()));
        assert_eq!(req.pair.organization_id, None);
    }

    #[test]
    fn create_chart_request_accepts_missing_roles() {
        let json = r#"{"chart_type_id":26}"#;
        let req: CreateChartRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.pair.person_id, None);
        assert_eq!(req.pair.associate_id, None);
        assert_eq!(req.pair.organization_id, None);
    }

    #[test]
    fn propagate_request_parses_snake_case_role() {
        let json = r#"{"entity_id":"p1","role":"person"}"#;
        let req: PropagateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.entity_id, "p1");
        assert_eq!(req.role, EntityRole::Person);

        let json = r#"{"entity_id":"o1","role":"organization"}"#;
        let req: PropagateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.role, EntityRole::Organization);

        assert!(serde_json::from_str::<PropagateRequest>(r#"{"entity_id":"x","role":"pet"}"#)
            .is_err());
    }

    #[test]
    fn synthesis_errors_map_to_expected_statuses() {
        use axum::response::IntoResponse;

        let cases = [
            (
                AppError::from(SynthesisError::InvalidCombination),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(SynthesisError::EntityNotFound {
                    role: EntityRole::Associate,
                    id: "a9".into(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(SynthesisError::Computation(
                    crate::engine::ComputeError::Upstream {
                        status: 500,
                        detail: "boom".into(),
                    },
                )),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::from(SynthesisError::Store(anyhow::anyhow!("db down"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(SynthesisError::Cache(anyhow::anyhow!("cache down"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
