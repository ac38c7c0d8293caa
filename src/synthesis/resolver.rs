//! Entity resolution
//!
//! Projects the three heterogeneous source records into the one shape the
//! computation engine accepts. Field names differ per record kind (birth vs
//! founding data, three name fields); missing optionals coerce to empty/zero
//! rather than failing, matching how the source profiles are stored.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::neo4j::models::{AssociateNode, OrganizationNode, PersonNode};
use crate::neo4j::ChartStore;

/// Which source table an id belongs to.
///
/// Variant order is the fixed subject order for computations (person, then
/// associate, then organization); `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    Person,
    Associate,
    Organization,
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityRole::Person => "person",
            EntityRole::Associate => "associate",
            EntityRole::Organization => "organization",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for EntityRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "person" => Ok(EntityRole::Person),
            "associate" => Ok(EntityRole::Associate),
            "organization" => Ok(EntityRole::Organization),
            other => Err(format!(
                "unknown role '{}', expected person, associate, or organization",
                other
            )),
        }
    }
}

/// The normalized computation input: one shape for all three entity kinds.
///
/// This struct is also the engine request body, so field names here are the
/// wire names the computation service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedEntity {
    pub display_name: String,
    pub reference_date: String,
    pub reference_time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset: f64,
}

/// Parse-or-default-to-zero coercion for stored numeric strings.
///
/// Profiles imported from older systems carry blanks and junk in these
/// fields; a malformed value must never fail a resolution.
fn parse_or_zero(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

fn text_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

impl From<&PersonNode> for ProjectedEntity {
    fn from(p: &PersonNode) -> Self {
        Self {
            display_name: p.full_name.clone(),
            reference_date: text_or_empty(p.birth_date.as_deref()),
            reference_time: text_or_empty(p.birth_time.as_deref()),
            latitude: parse_or_zero(p.birth_latitude.as_deref()),
            longitude: parse_or_zero(p.birth_longitude.as_deref()),
            utc_offset: parse_or_zero(p.utc_offset.as_deref()),
        }
    }
}

impl From<&AssociateNode> for ProjectedEntity {
    fn from(a: &AssociateNode) -> Self {
        Self {
            display_name: a.associate_name.clone(),
            reference_date: text_or_empty(a.birth_date.as_deref()),
            reference_time: text_or_empty(a.birth_time.as_deref()),
            latitude: parse_or_zero(a.birth_latitude.as_deref()),
            longitude: parse_or_zero(a.birth_longitude.as_deref()),
            utc_offset: parse_or_zero(a.utc_offset.as_deref()),
        }
    }
}

impl From<&OrganizationNode> for ProjectedEntity {
    fn from(o: &OrganizationNode) -> Self {
        Self {
            display_name: o.organization_name.clone(),
            reference_date: text_or_empty(o.founding_date.as_deref()),
            reference_time: text_or_empty(o.founding_time.as_deref()),
            latitude: parse_or_zero(o.latitude.as_deref()),
            longitude: parse_or_zero(o.longitude.as_deref()),
            utc_offset: parse_or_zero(o.utc_offset.as_deref()),
        }
    }
}

/// Resolves entity ids to projected entities via the chart store
pub struct EntityResolver {
    store: Arc<dyn ChartStore>,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn ChartStore>) -> Self {
        Self { store }
    }

    /// Resolve an id whose role is known (the fast path)
    pub async fn resolve(
        &self,
        id: &str,
        role: EntityRole,
    ) -> anyhow::Result<Option<ProjectedEntity>> {
        let projected = match role {
            EntityRole::Person => self.store.get_person(id).await?.map(|p| (&p).into()),
            EntityRole::Associate => self.store.get_associate(id).await?.map(|a| (&a).into()),
            EntityRole::Organization => {
                self.store.get_organization(id).await?.map(|o| (&o).into())
            }
        };
        Ok(projected)
    }

    /// Resolve an id with no role hint by probing the stores in sequence.
    ///
    /// Probe order is associate, then person, then organization; the fan-out
    /// path only knows the *other* side's id, and associates are by far the
    /// most common other side, so they are checked first.
    pub async fn resolve_any(
        &self,
        id: &str,
    ) -> anyhow::Result<Option<(EntityRole, ProjectedEntity)>> {
        if let Some(a) = self.store.get_associate(id).await? {
            return Ok(Some((EntityRole::Associate, (&a).into())));
        }
        if let Some(p) = self.store.get_person(id).await? {
            return Ok(Some((EntityRole::Person, (&p).into())));
        }
        if let Some(o) = self.store.get_organization(id).await? {
            return Ok(Some((EntityRole::Organization, (&o).into())));
        }
        tracing::debug!(entity_id = %id, "no source record found in any store");
        Ok(None)
    }
}
