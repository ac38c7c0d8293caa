//! `ChartStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::ChartStore;
use crate::synthesis::pair::CanonicalPair;

#[async_trait]
impl ChartStore for Neo4jClient {
    async fn get_person(&self, id: &str) -> anyhow::Result<Option<PersonNode>> {
        self.get_person(id).await
    }

    async fn get_associate(&self, id: &str) -> anyhow::Result<Option<AssociateNode>> {
        self.get_associate(id).await
    }

    async fn get_organization(&self, id: &str) -> anyhow::Result<Option<OrganizationNode>> {
        self.get_organization(id).await
    }

    async fn get_chart_type(&self, id: i64) -> anyhow::Result<Option<ChartTypeNode>> {
        self.get_chart_type(id).await
    }

    async fn list_chart_types(&self) -> anyhow::Result<Vec<ChartTypeNode>> {
        self.list_chart_types().await
    }

    async fn find_chart_by_pair(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
    ) -> anyhow::Result<Option<RelationshipChartNode>> {
        self.find_chart_by_pair(chart_type, pair).await
    }

    async fn find_charts_by_entity(
        &self,
        entity_id: &str,
    ) -> anyhow::Result<Vec<RelationshipChartNode>> {
        self.find_charts_by_entity(entity_id).await
    }

    async fn create_chart(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
        chart_data: &serde_json::Value,
    ) -> anyhow::Result<RelationshipChartNode> {
        self.create_chart(chart_type, pair, chart_data).await
    }

    async fn update_chart_payload(
        &self,
        chart_id: Uuid,
        chart_data: &serde_json::Value,
    ) -> anyhow::Result<RelationshipChartNode> {
        self.update_chart_payload(chart_id, chart_data).await
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }
}
