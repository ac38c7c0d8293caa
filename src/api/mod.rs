//! HTTP API for the synthesis engine

pub mod handlers;
pub mod routes;

pub use routes::create_router;
