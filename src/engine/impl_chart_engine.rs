//! `ChartEngine` implementation for `HttpChartEngine`.

use async_trait::async_trait;

use super::client::HttpChartEngine;
use super::traits::{ChartEngine, ComputeError};
use crate::neo4j::models::ChartType;
use crate::synthesis::resolver::ProjectedEntity;

#[async_trait]
impl ChartEngine for HttpChartEngine {
    async fn compute(
        &self,
        chart_type: ChartType,
        subject_a: &ProjectedEntity,
        subject_b: &ProjectedEntity,
    ) -> Result<serde_json::Value, ComputeError> {
        self.compute_inner(chart_type, subject_a, subject_b).await
    }

    async fn health_check(&self) -> bool {
        self.health_check_inner().await
    }
}
