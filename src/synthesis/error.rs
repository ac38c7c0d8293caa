//! Error taxonomy for the synthesis paths
//!
//! Creation-path callers need to distinguish all four kinds; the propagation
//! sweep logs per-chart failures instead of surfacing them.

use super::resolver::EntityRole;
use crate::engine::ComputeError;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// Zero, one, or three role ids supplied; exactly two are required
    #[error("exactly two of person_id, associate_id, organization_id must be supplied")]
    InvalidCombination,

    /// A role-specific or polymorphic entity lookup came back empty
    #[error("{role} {id} not found")]
    EntityNotFound { role: EntityRole, id: String },

    /// The external computation engine failed (including timeout)
    #[error("chart computation failed: {0}")]
    Computation(#[from] ComputeError),

    /// Durable store failure
    #[error("chart store error: {0}")]
    Store(#[source] anyhow::Error),

    /// Cache layer failure
    #[error("chart cache error: {0}")]
    Cache(#[source] anyhow::Error),
}
