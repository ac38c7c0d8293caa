//! Test helper factories and mock stack builders
//!
//! Convenience factories for source records plus a builder that wires a
//! `ChartSynthesizer` over the in-memory mocks, keeping handles to each
//! layer so tests can inspect and manipulate them directly.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::cache::{ChartCache, MemoryChartCache};
use crate::engine::mock::MockChartEngine;
use crate::neo4j::mock::MockChartStore;
use crate::neo4j::models::*;
use crate::synthesis::pair::CanonicalPair;
use crate::synthesis::ChartSynthesizer;

// ============================================================================
// Record factories
// ============================================================================

/// A person with complete birth data
pub fn person(id: &str, name: &str) -> PersonNode {
    PersonNode {
        id: id.to_string(),
        full_name: name.to_string(),
        birth_date: Some("1815-12-10".into()),
        birth_time: Some("04:30".into()),
        birth_latitude: Some("51.5074".into()),
        birth_longitude: Some("-0.1278".into()),
        utc_offset: Some("0".into()),
    }
}

/// An associate with complete birth data
pub fn associate(id: &str, name: &str) -> AssociateNode {
    AssociateNode {
        id: id.to_string(),
        associate_name: name.to_string(),
        owner_person_id: None,
        birth_date: Some("1906-12-09".into()),
        birth_time: Some("18:15".into()),
        birth_latitude: Some("40.7128".into()),
        birth_longitude: Some("-74.0060".into()),
        utc_offset: Some("-5".into()),
    }
}

/// An organization with complete founding data
pub fn organization(id: &str, name: &str) -> OrganizationNode {
    OrganizationNode {
        id: id.to_string(),
        organization_name: name.to_string(),
        founding_date: Some("1910-06-22".into()),
        founding_time: Some("09:00".into()),
        latitude: Some("52.5200".into()),
        longitude: Some("13.4050".into()),
        utc_offset: Some("1".into()),
    }
}

// ============================================================================
// Failure-injecting doubles
// ============================================================================

/// A cache whose every operation fails, for infrastructure-failure tests
pub struct FailingChartCache;

#[async_trait]
impl ChartCache for FailingChartCache {
    async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>> {
        Err(anyhow!("injected cache failure"))
    }

    async fn set(&self, _key: &str, _value: &serde_json::Value) -> Result<()> {
        Err(anyhow!("injected cache failure"))
    }
}

// ============================================================================
// Mock stack builder
// ============================================================================

/// A synthesizer wired over mocks, with direct handles to every layer
pub struct TestStack {
    pub synthesizer: ChartSynthesizer,
    pub store: Arc<MockChartStore>,
    pub cache: Arc<MemoryChartCache>,
    pub engine: Arc<MockChartEngine>,
}

impl TestStack {
    pub fn builder() -> TestStackBuilder {
        TestStackBuilder::default()
    }
}

#[derive(Default)]
pub struct TestStackBuilder {
    people: Vec<PersonNode>,
    associates: Vec<AssociateNode>,
    organizations: Vec<OrganizationNode>,
    charts: Vec<(ChartType, CanonicalPair, serde_json::Value)>,
}

impl TestStackBuilder {
    pub fn person(mut self, person: PersonNode) -> Self {
        self.people.push(person);
        self
    }

    pub fn associate(mut self, associate: AssociateNode) -> Self {
        self.associates.push(associate);
        self
    }

    pub fn organization(mut self, organization: OrganizationNode) -> Self {
        self.organizations.push(organization);
        self
    }

    pub fn chart(
        mut self,
        chart_type: ChartType,
        pair: CanonicalPair,
        chart_data: serde_json::Value,
    ) -> Self {
        self.charts.push((chart_type, pair, chart_data));
        self
    }

    pub async fn build(self) -> TestStack {
        let mut store = MockChartStore::new();
        for p in self.people {
            store = store.with_person(p).await;
        }
        for a in self.associates {
            store = store.with_associate(a).await;
        }
        for o in self.organizations {
            store = store.with_organization(o).await;
        }
        for (chart_type, pair, data) in self.charts {
            store = store.with_chart(chart_type, &pair, data).await;
        }

        let store = Arc::new(store);
        let cache = Arc::new(MemoryChartCache::new(128));
        let engine = Arc::new(MockChartEngine::new());
        let synthesizer =
            ChartSynthesizer::new(store.clone(), cache.clone(), engine.clone());

        TestStack {
            synthesizer,
            store,
            cache,
            engine,
        }
    }
}
