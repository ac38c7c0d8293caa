//! ChartEngine trait definition
//!
//! Boundary to the external astrological computation service. A computation
//! is a pure call: two projected entities in, an opaque chart payload out.
//! No retries happen here; retry policy, if any, belongs to callers.

use async_trait::async_trait;
use std::time::Duration;

use crate::neo4j::models::ChartType;
use crate::synthesis::resolver::ProjectedEntity;

/// Failure modes of a computation call
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    /// Connection-level failure before any response arrived
    #[error("chart engine unreachable: {0}")]
    Transport(String),

    /// The engine answered with a non-2xx status
    #[error("chart engine returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    /// The bounded request timeout elapsed; treated like any other failure
    #[error("chart engine timed out after {0:?}")]
    Timeout(Duration),

    /// 2xx response whose body was not the expected JSON payload
    #[error("chart engine returned a malformed payload: {0}")]
    MalformedPayload(String),
}

/// Abstract interface to the computation service.
#[async_trait]
pub trait ChartEngine: Send + Sync {
    /// Compute a chart for two projected entities.
    ///
    /// Synastry and composite use different endpoints; `chart_type` selects
    /// which. Argument order is subject A then subject B.
    async fn compute(
        &self,
        chart_type: ChartType,
        subject_a: &ProjectedEntity,
        subject_b: &ProjectedEntity,
    ) -> Result<serde_json::Value, ComputeError>;

    /// Check engine reachability (used by the health endpoint)
    async fn health_check(&self) -> bool;
}
