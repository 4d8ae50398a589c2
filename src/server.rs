pub mod pages;

use std::net::SocketAddr;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use staticfs::Result;

pub struct Server {
  bind_addr: SocketAddr,
  router: Router,
}

impl Server {
  pub fn new(bind_addr: SocketAddr, router: Router) -> Self {
    Self { bind_addr, router }
  }

  pub async fn run(self) -> Result<()> {
    let router = self.router.layer(TraceLayer::new_for_http());

    info!("listening on http://{}", self.bind_addr);
    axum::Server::try_bind(&self.bind_addr)?
      .serve(router.into_make_service())
      .await?;

    Ok(())
  }
}
