//! Pair canonicalization
//!
//! Request order must never affect storage or cache identity, so the two
//! supplied ids are sorted into a canonical pair here, and the cache key is
//! built here and nowhere else. Creation, fetch, and propagation all go
//! through these functions.

use serde::{Deserialize, Serialize};

use super::error::SynthesisError;
use super::resolver::EntityRole;
use crate::neo4j::models::ChartType;

/// Separator between cache-key segments
const KEY_SEPARATOR: char = ':';

/// Role-tagged ids as supplied by the caller; exactly two must be present
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairRequest {
    pub person_id: Option<String>,
    pub associate_id: Option<String>,
    pub organization_id: Option<String>,
}

/// Two entity ids in canonical (lexicographically sorted) order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalPair {
    low: String,
    high: String,
}

impl CanonicalPair {
    /// Build a canonical pair from two ids, in either order
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    /// Both ids in canonical order, for persisting as `entity_ids`
    pub fn ids(&self) -> [String; 2] {
        [self.low.clone(), self.high.clone()]
    }
}

/// Which two roles were supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RolePair {
    PersonAssociate,
    PersonOrganization,
    AssociateOrganization,
}

/// A validated pair request: the canonical pair plus the role-tagged sides.
///
/// `sides` is in fixed role order (person, then associate, then organization)
/// so that subject A / subject B of a computation are the same no matter how
/// the request body ordered its fields.
#[derive(Debug, Clone)]
pub struct PairSelection {
    pub pair: CanonicalPair,
    pub roles: RolePair,
    pub sides: [(EntityRole, String); 2],
}

/// Validate an "exactly two of three roles" request and canonicalize it.
///
/// Empty strings count as absent, so callers that deserialize form-ish bodies
/// can pass `Some("")` and get the same treatment as `None`.
pub fn canonicalize(req: &PairRequest) -> Result<PairSelection, SynthesisError> {
    fn supplied(v: &Option<String>) -> Option<&str> {
        v.as_deref().filter(|s| !s.trim().is_empty())
    }

    let mut sides: Vec<(EntityRole, String)> = Vec::with_capacity(2);
    if let Some(id) = supplied(&req.person_id) {
        sides.push((EntityRole::Person, id.to_string()));
    }
    if let Some(id) = supplied(&req.associate_id) {
        sides.push((EntityRole::Associate, id.to_string()));
    }
    if let Some(id) = supplied(&req.organization_id) {
        sides.push((EntityRole::Organization, id.to_string()));
    }

    let [first, second]: [(EntityRole, String); 2] = sides
        .try_into()
        .map_err(|_| SynthesisError::InvalidCombination)?;

    let roles = match (first.0, second.0) {
        (EntityRole::Person, EntityRole::Associate) => RolePair::PersonAssociate,
        (EntityRole::Person, EntityRole::Organization) => RolePair::PersonOrganization,
        (EntityRole::Associate, EntityRole::Organization) => RolePair::AssociateOrganization,
        // sides are pushed in fixed role order, so no other combination exists
        _ => return Err(SynthesisError::InvalidCombination),
    };

    Ok(PairSelection {
        pair: CanonicalPair::new(first.1.clone(), second.1.clone()),
        roles,
        sides: [first, second],
    })
}

/// The one and only cache-key scheme: `<chart type tag>:<low>:<high>`
pub fn cache_key(chart_type: ChartType, pair: &CanonicalPair) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        chart_type.tag(),
        pair.low(),
        pair.high(),
        sep = KEY_SEPARATOR
    )
}
