//! HTTP service around the tabplan planner and executor

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod routes;
pub mod transform;

pub use config::Config;
pub use error::ApiError;
pub use routes::{router, serve, AppState};
