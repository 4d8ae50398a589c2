mod cli;
mod demo;
mod server;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use staticfs::Result;

#[tokio::main]
async fn main() -> Result<()> {
  #[cfg(feature = "dotenv")]
  dotenv::dotenv().ok();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("staticfs=debug,tower_http=debug"));
  tracing_subscriber::fmt().with_env_filter(filter).init();

  let cli = Cli::parse();
  cli.run().await
}
