//! In-memory mock of the computation engine for testing.
//!
//! Records every call and can be told to fail for specific subjects, which
//! is how the propagation partial-failure tests inject per-chart errors.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{ChartEngine, ComputeError};
use crate::neo4j::models::ChartType;
use crate::synthesis::resolver::ProjectedEntity;

/// Mock engine: deterministic payloads, call counting, failure injection
pub struct MockChartEngine {
    calls: AtomicUsize,
    /// Display names for which compute() fails with an upstream error
    fail_for: RwLock<HashSet<String>>,
}

impl MockChartEngine {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_for: RwLock::new(HashSet::new()),
        }
    }

    /// Number of compute() invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make compute() fail whenever either subject has this display name
    pub async fn fail_for_subject(&self, display_name: &str) {
        self.fail_for.write().await.insert(display_name.to_string());
    }
}

#[async_trait]
impl ChartEngine for MockChartEngine {
    async fn compute(
        &self,
        chart_type: ChartType,
        subject_a: &ProjectedEntity,
        subject_b: &ProjectedEntity,
    ) -> Result<serde_json::Value, ComputeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let failing = self.fail_for.read().await;
        if failing.contains(&subject_a.display_name) || failing.contains(&subject_b.display_name) {
            return Err(ComputeError::Upstream {
                status: 500,
                detail: "injected failure".into(),
            });
        }

        Ok(serde_json::json!({
            "chart_type": chart_type.tag(),
            "subject_a": subject_a.display_name,
            "subject_b": subject_b.display_name,
            "computation": call,
        }))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
