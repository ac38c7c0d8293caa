//! External chart computation engine client

pub mod client;
mod impl_chart_engine;
pub mod traits;

pub use client::HttpChartEngine;
pub use traits::{ChartEngine, ComputeError};

#[cfg(test)]
pub(crate) mod mock;
