//! Fast key-value cache layer mirroring the chart store

pub mod memory;
pub mod traits;

pub use memory::MemoryChartCache;
pub use traits::ChartCache;
