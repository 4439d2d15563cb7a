pub mod cli;
pub mod config;
pub mod gateway;
pub mod ingest;
mod metrics;
pub mod schema;
pub mod server;
pub mod store;
pub mod utils;

pub use config::Opts;
pub use gateway::ImageGateway;
pub use ingest::Ingestor;
pub use schema::{BootstrapOutcome, RecreatePolicy, ensure_schema};
