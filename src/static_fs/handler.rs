use std::sync::Arc;

use axum::{
  body::Body,
  extract::State,
  http::{Request, StatusCode, Uri},
  response::{IntoResponse, Response},
  Router,
};
use tokio::sync::Mutex;
use tower::ServiceExt;
use tracing::warn;

use super::Resolver;
use crate::embedded::EmbeddedFs;

pub(super) use alias::{alias, AliasDispatch};
pub(super) use serve::serve;

mod serve {
  use super::*;

  pub(in crate::static_fs) async fn serve<F: EmbeddedFs>(
    State(resolver): State<Arc<Resolver<F>>>,
    request: Request<Body>,
  ) -> Response {
    let (parts, _body) = request.into_parts();
    resolver.handle(parts)
  }
}

mod alias {
  use super::*;

  /// The prefix routes, reachable again from an alias route. `Router` is
  /// not `Sync`, so it sits behind a lock and is cloned out per request.
  #[derive(Clone)]
  pub(in crate::static_fs) struct AliasDispatch {
    pub(in crate::static_fs) prefix: Arc<str>,
    pub(in crate::static_fs) router: Arc<Mutex<Router>>,
  }

  impl AliasDispatch {
    pub(in crate::static_fs) fn new(prefix: &str, router: Router) -> Self {
      Self {
        prefix: prefix.into(),
        router: Arc::new(Mutex::new(router)),
      }
    }
  }

  /// Rewrites `/<name>` to `/<prefix>/<name>` and routes the request again,
  /// so it reaches the resolver exactly like a direct prefixed request.
  pub(in crate::static_fs) async fn alias(
    State(dispatch): State<AliasDispatch>,
    mut request: Request<Body>,
  ) -> Response {
    let path_and_query = request
      .uri()
      .path_and_query()
      .map(|pq| pq.as_str())
      .unwrap_or_else(|| request.uri().path());
    let target = format!("/{}{}", dispatch.prefix, path_and_query);

    match Uri::try_from(target) {
      Ok(uri) => *request.uri_mut() = uri,
      Err(err) => {
        warn!("cannot rewrite alias {}: {err}", request.uri());
        return StatusCode::NOT_FOUND.into_response();
      }
    }

    let router = dispatch.router.lock().await.clone();
    match router.oneshot(request).await {
      Ok(response) => response,
      Err(never) => match never {},
    }
  }
}
