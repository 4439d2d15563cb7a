use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::Opts;

#[derive(Parser, Debug, Clone)]
pub struct SchemaCommand {}

impl SubCommandExtend for SchemaCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let schema = opts.store.connect()?.schema().await?;
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
