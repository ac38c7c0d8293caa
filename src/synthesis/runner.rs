//! Chart synthesizer: lookup-or-create and fan-out propagation
//!
//! The lookup chain is cache, then store, then compute. The store is the
//! source of truth; the cache is only written after a successful store read
//! or write, with the key built by `pair::cache_key` on every path.

use std::sync::Arc;

use serde::Serialize;

use super::error::SynthesisError;
use super::pair::{cache_key, canonicalize, CanonicalPair, PairRequest};
use super::resolver::{EntityResolver, EntityRole, ProjectedEntity};
use crate::cache::ChartCache;
use crate::engine::ChartEngine;
use crate::neo4j::models::{ChartType, RelationshipChartNode};
use crate::neo4j::ChartStore;

/// Result of a lookup-or-create request
#[derive(Debug, Clone, Serialize)]
pub struct ChartOutcome {
    pub chart: RelationshipChartNode,
    /// True when this request computed and persisted the chart
    pub created: bool,
}

/// Result of a propagation sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct PropagationSummary {
    pub charts_found: usize,
    pub charts_updated: usize,
    pub charts_skipped: usize,
}

/// Top-level synthesis logic over the store, cache, and computation engine
pub struct ChartSynthesizer {
    store: Arc<dyn ChartStore>,
    cache: Arc<dyn ChartCache>,
    engine: Arc<dyn ChartEngine>,
    resolver: EntityResolver,
}

impl ChartSynthesizer {
    /// Create a new synthesizer
    pub fn new(
        store: Arc<dyn ChartStore>,
        cache: Arc<dyn ChartCache>,
        engine: Arc<dyn ChartEngine>,
    ) -> Self {
        let resolver = EntityResolver::new(store.clone());
        Self {
            store,
            cache,
            engine,
            resolver,
        }
    }

    /// Get the chart store
    pub fn store(&self) -> &dyn ChartStore {
        self.store.as_ref()
    }

    /// Get the computation engine
    pub fn engine(&self) -> &dyn ChartEngine {
        self.engine.as_ref()
    }

    // ========================================================================
    // Lookup-or-create
    // ========================================================================

    /// Return the chart for a pair and type, computing and persisting it on
    /// first request. Terminal on the first hit in cache → store → compute.
    pub async fn get_or_create(
        &self,
        chart_type: ChartType,
        req: &PairRequest,
    ) -> Result<ChartOutcome, SynthesisError> {
        let selection = canonicalize(req)?;
        let key = cache_key(chart_type, &selection.pair);

        // 1. Cache
        if let Some(value) = self.cache.get(&key).await.map_err(SynthesisError::Cache)? {
            match serde_json::from_value::<RelationshipChartNode>(value) {
                Ok(chart) => {
                    tracing::debug!(%key, chart_id = %chart.id, "cache hit");
                    return Ok(ChartOutcome {
                        chart,
                        created: false,
                    });
                }
                Err(e) => {
                    // Treat an undecodable entry as a miss; the store read
                    // below refreshes it with a good value.
                    tracing::warn!(%key, error = %e, "discarding undecodable cache entry");
                }
            }
        }

        // 2. Store, with write-through on hit
        if let Some(chart) = self
            .store
            .find_chart_by_pair(chart_type, &selection.pair)
            .await
            .map_err(SynthesisError::Store)?
        {
            self.write_through(&key, &chart).await?;
            tracing::debug!(%key, chart_id = %chart.id, "store hit");
            return Ok(ChartOutcome {
                chart,
                created: false,
            });
        }

        // 3. Resolve both sides; no partial chart is created on failure
        let mut subjects: Vec<ProjectedEntity> = Vec::with_capacity(2);
        for (role, id) in &selection.sides {
            let projected = self
                .resolver
                .resolve(id, *role)
                .await
                .map_err(SynthesisError::Store)?
                .ok_or_else(|| SynthesisError::EntityNotFound {
                    role: *role,
                    id: id.clone(),
                })?;
            subjects.push(projected);
        }

        // 4. Compute, then persist store-first
        let payload = self
            .engine
            .compute(chart_type, &subjects[0], &subjects[1])
            .await?;

        let chart = self
            .store
            .create_chart(chart_type, &selection.pair, &payload)
            .await
            .map_err(SynthesisError::Store)?;
        self.write_through(&key, &chart).await?;

        tracing::info!(
            chart_id = %chart.id,
            chart_type = chart_type.tag(),
            pair = %key,
            "created relationship chart"
        );
        Ok(ChartOutcome {
            chart,
            created: true,
        })
    }

    // ========================================================================
    // Fan-out propagation
    // ========================================================================

    /// Recompute every chart referencing a changed entity, best-effort.
    ///
    /// Each chart is processed independently; a failed lookup, computation,
    /// or write leaves that chart stale and moves on. No rollback, no retry.
    pub async fn propagate_update(
        &self,
        entity_id: &str,
        role: EntityRole,
    ) -> Result<PropagationSummary, SynthesisError> {
        let charts = self
            .store
            .find_charts_by_entity(entity_id)
            .await
            .map_err(SynthesisError::Store)?;

        let mut summary = PropagationSummary {
            charts_found: charts.len(),
            ..Default::default()
        };
        if charts.is_empty() {
            return Ok(summary);
        }

        let changed = match self.resolver.resolve(entity_id, role).await {
            Ok(Some(projected)) => projected,
            Ok(None) => {
                // The entity may have been deleted since the trigger fired
                tracing::warn!(%entity_id, %role, "changed entity no longer exists, skipping sweep");
                summary.charts_skipped = summary.charts_found;
                return Ok(summary);
            }
            Err(e) => return Err(SynthesisError::Store(e)),
        };

        for chart in charts {
            if self.refresh_chart(&chart, entity_id, role, &changed).await {
                summary.charts_updated += 1;
            } else {
                summary.charts_skipped += 1;
            }
        }

        tracing::info!(
            %entity_id,
            found = summary.charts_found,
            updated = summary.charts_updated,
            skipped = summary.charts_skipped,
            "propagation sweep complete"
        );
        Ok(summary)
    }

    /// Recompute one chart against the changed entity. Returns whether the
    /// chart was updated; every failure path logs and returns false.
    async fn refresh_chart(
        &self,
        chart: &RelationshipChartNode,
        changed_id: &str,
        changed_role: EntityRole,
        changed: &ProjectedEntity,
    ) -> bool {
        let chart_id = chart.id;

        let Some(chart_type) = ChartType::from_id(chart.chart_type_id) else {
            tracing::warn!(%chart_id, chart_type_id = chart.chart_type_id, "unknown chart type, skipping");
            return false;
        };

        let Some(other_id) = chart.other_entity(changed_id) else {
            tracing::warn!(%chart_id, "malformed entity pair, skipping");
            return false;
        };

        let (other_role, other) = match self.resolver.resolve_any(other_id).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                tracing::warn!(%chart_id, %other_id, "other entity not found, chart left stale");
                return false;
            }
            Err(e) => {
                tracing::warn!(%chart_id, %other_id, error = %e, "other entity lookup failed, chart left stale");
                return false;
            }
        };

        // Subjects go to the engine in the same fixed role order as creation,
        // so a recomputed payload has the same orientation as the original.
        let (subject_a, subject_b) = if changed_role <= other_role {
            (changed, &other)
        } else {
            (&other, changed)
        };

        let payload = match self.engine.compute(chart_type, subject_a, subject_b).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(%chart_id, error = %e, "recomputation failed, chart left stale");
                return false;
            }
        };

        let updated = match self.store.update_chart_payload(chart_id, &payload).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(%chart_id, error = %e, "store update failed, chart left stale");
                return false;
            }
        };

        // Same key scheme as creation. A cache write failure here is logged
        // but still counts as updated: the store, the source of truth, moved.
        let pair = CanonicalPair::new(updated.entity_ids[0].clone(), updated.entity_ids[1].clone());
        let key = cache_key(chart_type, &pair);
        if let Err(e) = self.refresh_cache(&key, &updated).await {
            tracing::warn!(%chart_id, %key, error = %e, "cache refresh failed after update");
        }

        tracing::debug!(%chart_id, %key, "chart recomputed");
        true
    }

    // ========================================================================
    // Cache plumbing
    // ========================================================================

    /// Mirror a chart into the cache; creation-path failures propagate
    async fn write_through(
        &self,
        key: &str,
        chart: &RelationshipChartNode,
    ) -> Result<(), SynthesisError> {
        self.refresh_cache(key, chart)
            .await
            .map_err(SynthesisError::Cache)
    }

    async fn refresh_cache(&self, key: &str, chart: &RelationshipChartNode) -> anyhow::Result<()> {
        let value = serde_json::to_value(chart)?;
        self.cache.set(key, &value).await
    }
}
