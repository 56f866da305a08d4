pub mod bootstrap;
pub mod config;
pub mod context;
pub mod error;
pub mod jellyfin;
pub mod logging;
pub mod models;
pub mod pool;
pub mod repository;
pub mod schedule;
pub mod sidecar;

pub use config::Config;
pub use context::Context;
pub use error::{Error, Result};
