use clap::Parser;
use env_logger::Env;

use imvec::cli::SubCommandExtend;
use imvec::config::{Opts, SubCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Serve(config) => config.run(&opts).await,
        SubCommand::Ingest(config) => config.run(&opts).await,
        SubCommand::Query(config) => config.run(&opts).await,
        SubCommand::Schema(config) => config.run(&opts).await,
    }
}
