use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::{demo, server::Server};
use staticfs::Result;

#[derive(Parser)]
/// serve the bundled demo assets
pub struct Cli {
  /// address to listen on
  #[arg(short, long, env, default_value = "127.0.0.1:3000")]
  bind_addr: SocketAddr,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug)]
/// subcommands
pub enum Command {
  /// serve files under /static only
  Simple,
  /// also expose top level files at the site root (default subcommand)
  Aliasing,
  /// set cache headers from lookup callbacks
  Callbacks,
}

impl Cli {
  pub async fn run(self) -> Result<()> {
    let command = self.command.unwrap_or(Command::Aliasing);
    info!("running the {command:?} demo");

    let router = match command {
      Command::Simple => demo::simple()?,
      Command::Aliasing => demo::aliasing()?,
      Command::Callbacks => demo::callbacks()?,
    };

    Server::new(self.bind_addr, router).run().await
  }
}
