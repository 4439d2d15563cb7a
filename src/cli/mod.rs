mod ingest;
mod query;
mod schema;
pub mod serve;

pub use ingest::*;
pub use query::*;
pub use schema::*;
pub use serve::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
