mod context;
mod handler;

use std::sync::Arc;

use axum::{
  body::Bytes,
  http::{request, HeaderMap, StatusCode},
  response::Response,
  routing::get,
  Router,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, warn};

pub use context::Context;

use crate::{
  embedded::{EmbeddedFs, Entry},
  file_server::{respond, FileServer},
  path,
  util::{Error, Result},
};

pub const DEFAULT_PREFIX: &str = "static";

/// Characters escaped when an asset name becomes a route path.
const SEGMENT: &AsciiSet = &CONTROLS
  .add(b' ')
  .add(b'"')
  .add(b'#')
  .add(b'%')
  .add(b'/')
  .add(b'<')
  .add(b'>')
  .add(b'?')
  .add(b'`')
  .add(b'{')
  .add(b'}');

pub type OkCallback = Arc<dyn Fn(&mut Context<'_>, &str) + Send + Sync>;
pub type ErrCallback = Arc<dyn Fn(&mut Context<'_>, &Error) + Send + Sync>;

/// A top level asset that is also reachable from the site root, e.g.
/// `/robots.txt` for `/static/robots.txt`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display(fmt = "/{}", _0)]
pub struct Alias(String);

impl Alias {
  pub fn name(&self) -> &str {
    &self.0
  }

  pub(crate) fn route(&self) -> String {
    format!("/{}", utf8_percent_encode(&self.0, SEGMENT))
  }
}

/// Serves the files below `<prefix>/` of an embedded tree under the
/// `/<prefix>/` URL path.
pub struct StaticFs<F> {
  fs: Arc<F>,
  prefix: String,
  aliases: Vec<Alias>,
  ok_callback: Option<OkCallback>,
  err_callback: Option<ErrCallback>,
}

impl<F: EmbeddedFs> StaticFs<F> {
  pub fn new(fs: F) -> Self {
    Self::with_prefix(fs, DEFAULT_PREFIX)
  }

  pub fn with_prefix(fs: F, prefix: &str) -> Self {
    let mut prefix = prefix.trim_matches('/').to_string();
    if prefix.is_empty() {
      warn!("empty static prefix, falling back to `{DEFAULT_PREFIX}`");
      prefix = DEFAULT_PREFIX.to_string();
    }

    Self {
      fs: Arc::new(fs),
      prefix,
      aliases: vec![],
      ok_callback: None,
      err_callback: None,
    }
  }

  /// Makes every file directly inside `<prefix>/` available at the site
  /// root as well. Subdirectories are not aliased.
  pub fn with_root_aliases(mut self) -> Result<Self> {
    let entries = self.fs.read_dir(&self.prefix)?;

    self.aliases = entries
      .into_iter()
      .filter(|entry| !entry.is_dir)
      .filter_map(|entry| {
        if entry.name.contains(|c: char| c == ':' || c == '*') {
          warn!("not aliasing {}: name clashes with route syntax", entry.name);
          return None;
        }
        Some(Alias(entry.name))
      })
      .collect();

    debug!("discovered {} root aliases", self.aliases.len());
    Ok(self)
  }

  /// Called with the resolved path right before a file is served.
  pub fn with_ok_callback<C>(mut self, callback: C) -> Self
  where
    C: Fn(&mut Context<'_>, &str) + Send + Sync + 'static,
  {
    self.ok_callback = Some(Arc::new(callback));
    self
  }

  /// Called with the lookup error right before a 404 is written.
  pub fn with_err_callback<C>(mut self, callback: C) -> Self
  where
    C: Fn(&mut Context<'_>, &Error) + Send + Sync + 'static,
  {
    self.err_callback = Some(Arc::new(callback));
    self
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  pub fn aliases(&self) -> &[Alias] {
    &self.aliases
  }

  /// Registers `GET`/`HEAD /<prefix>/*filepath` and one `GET`/`HEAD` route
  /// per alias on `router`.
  ///
  /// Alias routes are plain static paths, so they panic on registration
  /// like any other axum route if `router` already has the same path.
  pub fn configure<S>(self, router: Router<S>) -> Router<S>
  where
    S: Clone + Send + Sync + 'static,
  {
    let resolver = Arc::new(Resolver {
      root: format!("/{}", self.prefix),
      fs: self.fs.clone(),
      file_server: FileServer::new(self.fs),
      ok_callback: self.ok_callback,
      err_callback: self.err_callback,
    });

    let mut router = router.merge(prefix_routes::<F, S>(&self.prefix, resolver.clone()));

    if !self.aliases.is_empty() {
      let dispatch =
        handler::AliasDispatch::new(&self.prefix, prefix_routes(&self.prefix, resolver));
      for alias in &self.aliases {
        router = router.route(
          &alias.route(),
          get(handler::alias)
            .head(handler::alias)
            .with_state(dispatch.clone()),
        );
      }
    }

    router
  }

  /// Same as [`configure`](Self::configure) on an empty router.
  pub fn router<S>(self) -> Router<S>
  where
    S: Clone + Send + Sync + 'static,
  {
    self.configure(Router::new())
  }
}

fn prefix_routes<F, S>(prefix: &str, resolver: Arc<Resolver<F>>) -> Router<S>
where
  F: EmbeddedFs,
  S: Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      &format!("/{prefix}/*filepath"),
      get(handler::serve::<F>).head(handler::serve::<F>),
    )
    .with_state(resolver)
}

pub(crate) struct Resolver<F> {
  root: String,
  fs: Arc<F>,
  file_server: FileServer<F>,
  ok_callback: Option<OkCallback>,
  err_callback: Option<ErrCallback>,
}

impl<F: EmbeddedFs> Resolver<F> {
  fn handle(&self, request: request::Parts) -> Response {
    let mut headers = HeaderMap::new();

    match self.resolve(request.uri.path()) {
      Ok(path) => {
        debug!("serving {path}");
        if let Some(callback) = &self.ok_callback {
          callback(&mut Context::new(&request, &mut headers), &path);
        }
        self.file_server.serve(&request, &path, headers)
      }
      Err(err) => {
        debug!("lookup of {} failed: {err}", request.uri.path());
        if let Some(callback) = &self.err_callback {
          callback(&mut Context::new(&request, &mut headers), &err);
        }
        respond(StatusCode::NOT_FOUND, headers, Bytes::new())
      }
    }
  }

  /// Maps a request path to a file below the prefix. The result is rooted,
  /// e.g. `/static/css/styles.css`.
  fn resolve(&self, request_path: &str) -> Result<String> {
    let not_found = || Error::NotFound(request_path.to_string());

    let rest = request_path
      .strip_prefix(self.root.as_str())
      .ok_or_else(not_found)?;
    let rest = percent_decode_str(rest)
      .decode_utf8()
      .map_err(|_| not_found())?;

    let resolved = path::join(&self.root, &path::clean(&format!("/{rest}")));

    match self.fs.open(&resolved)? {
      // a file is never addressed as a directory
      Entry::File(_) if rest.ends_with('/') => Err(Error::NotFound(resolved)),
      Entry::File(_) => Ok(resolved),
      Entry::Dir => Err(Error::IsDirectory(resolved)),
    }
  }
}
