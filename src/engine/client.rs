//! HTTP client for the external computation engine

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use super::traits::ComputeError;
use crate::neo4j::models::ChartType;
use crate::synthesis::resolver::ProjectedEntity;

/// Request body for both computation endpoints
#[derive(Serialize)]
struct ComputeRequest<'a> {
    subject_a: &'a ProjectedEntity,
    subject_b: &'a ProjectedEntity,
}

/// Client for the external chart computation service
pub struct HttpChartEngine {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpChartEngine {
    /// Create a new engine client with a bounded per-request timeout
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build chart engine HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Endpoint for a chart type: `<base>/v1/charts/<tag>`
    fn endpoint(&self, chart_type: ChartType) -> String {
        format!("{}/v1/charts/{}", self.base_url, chart_type.tag())
    }

    pub(super) async fn compute_inner(
        &self,
        chart_type: ChartType,
        subject_a: &ProjectedEntity,
        subject_b: &ProjectedEntity,
    ) -> Result<serde_json::Value, ComputeError> {
        let resp = self
            .http
            .post(self.endpoint(chart_type))
            .json(&ComputeRequest {
                subject_a,
                subject_b,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ComputeError::Timeout(self.timeout)
                } else {
                    ComputeError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ComputeError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        resp.json::<serde_json::Value>().await.map_err(|e| {
            if e.is_timeout() {
                ComputeError::Timeout(self.timeout)
            } else {
                ComputeError::MalformedPayload(e.to_string())
            }
        })
    }

    pub(super) async fn health_check_inner(&self) -> bool {
        self.http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
