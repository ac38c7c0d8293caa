//! Relationship chart synthesis: canonicalization, resolution, orchestration

pub mod error;
pub mod pair;
pub mod resolver;
pub mod runner;

pub use error::SynthesisError;
pub use pair::{cache_key, canonicalize, CanonicalPair, PairRequest};
pub use resolver::{EntityResolver, EntityRole, ProjectedEntity};
pub use runner::{ChartOutcome, ChartSynthesizer, PropagationSummary};
