//! In-memory mock implementation of ChartStore for testing.
//!
//! Backs every store with `tokio::sync::RwLock<HashMap<K, V>>` and keeps the
//! client's semantics where they matter: `create_chart` is find-or-insert on
//! the pair key, the same race-benign behavior the MERGE gives the real store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::*;
use super::traits::ChartStore;
use crate::synthesis::pair::CanonicalPair;

/// In-memory mock implementation of ChartStore for testing.
pub struct MockChartStore {
    pub people: RwLock<HashMap<String, PersonNode>>,
    pub associates: RwLock<HashMap<String, AssociateNode>>,
    pub organizations: RwLock<HashMap<String, OrganizationNode>>,
    /// Charts keyed by pair key (`<chart_type_id>:<low>:<high>`)
    pub charts: RwLock<HashMap<String, RelationshipChartNode>>,
    /// When true, every chart operation fails (infrastructure-failure tests)
    pub fail_chart_ops: RwLock<bool>,
    /// Total entity lookups (person + associate + organization reads)
    pub entity_lookups: AtomicUsize,
}

fn pair_key(chart_type_id: i64, low: &str, high: &str) -> String {
    format!("{}:{}:{}", chart_type_id, low, high)
}

impl MockChartStore {
    /// Create a new empty MockChartStore.
    pub fn new() -> Self {
        Self {
            people: RwLock::new(HashMap::new()),
            associates: RwLock::new(HashMap::new()),
            organizations: RwLock::new(HashMap::new()),
            charts: RwLock::new(HashMap::new()),
            fail_chart_ops: RwLock::new(false),
            entity_lookups: AtomicUsize::new(0),
        }
    }

    /// Number of entity reads performed so far
    pub fn entity_lookup_count(&self) -> usize {
        self.entity_lookups.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a person into the store.
    pub async fn with_person(self, person: PersonNode) -> Self {
        self.people.write().await.insert(person.id.clone(), person);
        self
    }

    /// Seed an associate into the store.
    pub async fn with_associate(self, associate: AssociateNode) -> Self {
        self.associates
            .write()
            .await
            .insert(associate.id.clone(), associate);
        self
    }

    /// Seed an organization into the store.
    pub async fn with_organization(self, organization: OrganizationNode) -> Self {
        self.organizations
            .write()
            .await
            .insert(organization.id.clone(), organization);
        self
    }

    /// Seed an existing chart for a pair.
    pub async fn with_chart(
        self,
        chart_type: ChartType,
        pair: &CanonicalPair,
        chart_data: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        let chart = RelationshipChartNode {
            id: Uuid::new_v4(),
            chart_type_id: chart_type.id(),
            entity_ids: pair.ids(),
            chart_data,
            created_at: now,
            updated_at: now,
        };
        self.charts
            .write()
            .await
            .insert(pair_key(chart.chart_type_id, pair.low(), pair.high()), chart);
        self
    }

    /// Remove a previously seeded associate (simulates concurrent deletion).
    pub async fn delete_associate(&self, id: &str) {
        self.associates.write().await.remove(id);
    }

    /// Make all chart operations fail until called with `false`.
    pub async fn set_fail_chart_ops(&self, fail: bool) {
        *self.fail_chart_ops.write().await = fail;
    }

    async fn check_chart_ops(&self) -> Result<()> {
        if *self.fail_chart_ops.read().await {
            Err(anyhow!("injected chart store failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChartStore for MockChartStore {
    async fn get_person(&self, id: &str) -> Result<Option<PersonNode>> {
        self.entity_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.people.read().await.get(id).cloned())
    }

    async fn get_associate(&self, id: &str) -> Result<Option<AssociateNode>> {
        self.entity_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.associates.read().await.get(id).cloned())
    }

    async fn get_organization(&self, id: &str) -> Result<Option<OrganizationNode>> {
        self.entity_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.organizations.read().await.get(id).cloned())
    }

    async fn get_chart_type(&self, id: i64) -> Result<Option<ChartTypeNode>> {
        Ok(ChartType::from_id(id).map(|t| ChartTypeNode {
            id: t.id(),
            name: t.display_name().to_string(),
        }))
    }

    async fn list_chart_types(&self) -> Result<Vec<ChartTypeNode>> {
        Ok([ChartType::Synastry, ChartType::Composite]
            .into_iter()
            .map(|t| ChartTypeNode {
                id: t.id(),
                name: t.display_name().to_string(),
            })
            .collect())
    }

    async fn find_chart_by_pair(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
    ) -> Result<Option<RelationshipChartNode>> {
        self.check_chart_ops().await?;
        let key = pair_key(chart_type.id(), pair.low(), pair.high());
        Ok(self.charts.read().await.get(&key).cloned())
    }

    async fn find_charts_by_entity(&self, entity_id: &str) -> Result<Vec<RelationshipChartNode>> {
        self.check_chart_ops().await?;
        let charts = self.charts.read().await;
        let mut found: Vec<RelationshipChartNode> = charts
            .values()
            .filter(|c| c.entity_ids.iter().any(|id| id == entity_id))
            .cloned()
            .collect();
        found.sort_by_key(|c| c.created_at);
        Ok(found)
    }

    async fn create_chart(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
        chart_data: &serde_json::Value,
    ) -> Result<RelationshipChartNode> {
        self.check_chart_ops().await?;
        let key = pair_key(chart_type.id(), pair.low(), pair.high());
        let mut charts = self.charts.write().await;

        // Find-or-insert, like MERGE on the unique pair key
        if let Some(existing) = charts.get(&key) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let chart = RelationshipChartNode {
            id: Uuid::new_v4(),
            chart_type_id: chart_type.id(),
            entity_ids: pair.ids(),
            chart_data: chart_data.clone(),
            created_at: now,
            updated_at: now,
        };
        charts.insert(key, chart.clone());
        Ok(chart)
    }

    async fn update_chart_payload(
        &self,
        chart_id: Uuid,
        chart_data: &serde_json::Value,
    ) -> Result<RelationshipChartNode> {
        self.check_chart_ops().await?;
        let mut charts = self.charts.write().await;
        let chart = charts
            .values_mut()
            .find(|c| c.id == chart_id)
            .ok_or_else(|| anyhow!("chart {} not found", chart_id))?;
        chart.chart_data = chart_data.clone();
        chart.updated_at = Utc::now();
        Ok(chart.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
