//! Neo4j client and models for the durable chart store

pub mod client;
mod impl_chart_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::ChartStore;

#[cfg(test)]
pub(crate) mod mock;
