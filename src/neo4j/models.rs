//! Graph models for source entities and derived relationship charts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Chart types (static reference data)
// ============================================================================

/// The two chart types this engine derives.
///
/// The numeric ids come from the product's chart-type reference table;
/// only these two rows are relevant to relationship synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Synastry,
    Composite,
}

impl ChartType {
    /// Numeric id, as stored in `RelationshipChartNode::chart_type_id`
    pub fn id(self) -> i64 {
        match self {
            ChartType::Synastry => 25,
            ChartType::Composite => 26,
        }
    }

    /// Resolve a stored numeric id back to a chart type
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            25 => Some(ChartType::Synastry),
            26 => Some(ChartType::Composite),
            _ => None,
        }
    }

    /// Stable lowercase tag, used in cache keys and engine endpoint paths
    pub fn tag(self) -> &'static str {
        match self {
            ChartType::Synastry => "synastry",
            ChartType::Composite => "composite",
        }
    }

    /// Human-readable name (display only)
    pub fn display_name(self) -> &'static str {
        match self {
            ChartType::Synastry => "Synastry Chart",
            ChartType::Composite => "Composite Chart",
        }
    }
}

/// A chart-type reference row, seeded at schema init
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartTypeNode {
    pub id: i64,
    pub name: String,
}

// ============================================================================
// Source entities (read-only from this engine's perspective)
// ============================================================================

/// A subscriber with birth data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonNode {
    pub id: String,
    pub full_name: String,
    pub birth_date: Option<String>,
    pub birth_time: Option<String>,
    pub birth_latitude: Option<String>,
    pub birth_longitude: Option<String>,
    pub utc_offset: Option<String>,
}

/// A named associate of a person (partner, friend, family member)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociateNode {
    pub id: String,
    pub associate_name: String,
    /// The person who added this associate to their profile
    pub owner_person_id: Option<String>,
    pub birth_date: Option<String>,
    pub birth_time: Option<String>,
    pub birth_latitude: Option<String>,
    pub birth_longitude: Option<String>,
    pub utc_offset: Option<String>,
}

/// An organization with founding data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationNode {
    pub id: String,
    pub organization_name: String,
    pub founding_date: Option<String>,
    pub founding_time: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub utc_offset: Option<String>,
}

// ============================================================================
// Relationship charts (owned by this engine)
// ============================================================================

/// A computed relationship chart between two entities.
///
/// `entity_ids` is always in canonical (lexicographically sorted) order;
/// the sort happens in `synthesis::pair` before anything touches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipChartNode {
    pub id: Uuid,
    pub chart_type_id: i64,
    pub entity_ids: [String; 2],
    /// Opaque payload from the computation engine, replaced wholesale on update
    pub chart_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RelationshipChartNode {
    /// The member of `entity_ids` that is not `id`.
    ///
    /// Returns `None` when `id` is not in the pair or the pair is degenerate
    /// (both ids equal); callers treat that as a malformed chart and skip it.
    pub fn other_entity(&self, id: &str) -> Option<&str> {
        let [low, high] = &self.entity_ids;
        if low == high {
            return None;
        }
        if low == id {
            Some(high)
        } else if high == id {
            Some(low)
        } else {
            None
        }
    }
}
