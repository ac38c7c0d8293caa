//! ChartStore trait definition
//!
//! Abstract interface over the durable store: read-only lookups for the
//! three source-entity kinds, chart-type reference data, and full ownership
//! of relationship-chart records. Mirrors the public async methods of
//! `Neo4jClient`, enabling testing with mock implementations.

use crate::neo4j::models::*;
use crate::synthesis::pair::CanonicalPair;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Abstract interface for all durable-store operations.
#[async_trait]
pub trait ChartStore: Send + Sync {
    // ========================================================================
    // Source entity lookups (read-only)
    // ========================================================================

    /// Get a person by id
    async fn get_person(&self, id: &str) -> Result<Option<PersonNode>>;

    /// Get an associate by id
    async fn get_associate(&self, id: &str) -> Result<Option<AssociateNode>>;

    /// Get an organization by id
    async fn get_organization(&self, id: &str) -> Result<Option<OrganizationNode>>;

    // ========================================================================
    // Chart-type reference data
    // ========================================================================

    /// Get a chart type by numeric id
    async fn get_chart_type(&self, id: i64) -> Result<Option<ChartTypeNode>>;

    /// List all chart types relevant to relationship synthesis
    async fn list_chart_types(&self) -> Result<Vec<ChartTypeNode>>;

    // ========================================================================
    // Relationship charts
    // ========================================================================

    /// Find the chart for a canonical pair and chart type, if one exists
    async fn find_chart_by_pair(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
    ) -> Result<Option<RelationshipChartNode>>;

    /// Find every chart whose pair contains the given entity id (fan-out use)
    async fn find_charts_by_entity(&self, entity_id: &str) -> Result<Vec<RelationshipChartNode>>;

    /// Create the chart for a canonical pair and chart type.
    ///
    /// Creation is race-safe: a uniqueness constraint on the derived pair key
    /// means a concurrent create of the same pair/type yields the row the
    /// winner inserted rather than a duplicate.
    async fn create_chart(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
        chart_data: &serde_json::Value,
    ) -> Result<RelationshipChartNode>;

    /// Replace a chart's payload wholesale, bumping `updated_at`
    async fn update_chart_payload(
        &self,
        chart_id: Uuid,
        chart_data: &serde_json::Value,
    ) -> Result<RelationshipChartNode>;

    /// Check store connectivity
    async fn health_check(&self) -> Result<bool>;
}
