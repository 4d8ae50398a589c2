//! The three demo sites the binary can serve.

use std::sync::Arc;

use axum::{
  http::{header, HeaderValue},
  routing::get,
  Extension, Router,
};
use rust_embed::RustEmbed;

use crate::server::pages::{self, IndexPage};
use staticfs::{Embedded, EmbeddedFs, Result, StaticFs};

#[derive(RustEmbed)]
#[folder = "demos/"]
struct Assets;

fn assets() -> Embedded<Assets> {
  Embedded::new()
}

/// Every file in a subdirectory of `dir`, relative to `dir`.
fn nested_files(fs: &impl EmbeddedFs, dir: &str) -> Result<Vec<String>> {
  let mut files = vec![];
  for entry in fs.read_dir(dir)? {
    if !entry.is_dir {
      continue;
    }
    let subdir = format!("{dir}/{}", entry.name);
    for file in walk(fs, &subdir)? {
      files.push(format!("{}/{file}", entry.name));
    }
  }
  Ok(files)
}

fn walk(fs: &impl EmbeddedFs, dir: &str) -> Result<Vec<String>> {
  let mut files = vec![];
  for entry in fs.read_dir(dir)? {
    if entry.is_dir {
      for file in walk(fs, &format!("{dir}/{}", entry.name))? {
        files.push(format!("{}/{file}", entry.name));
      }
    } else {
      files.push(entry.name);
    }
  }
  Ok(files)
}

fn site(static_fs: StaticFs<Embedded<Assets>>, caching: bool) -> Result<Router> {
  let page = IndexPage {
    prefix: static_fs.prefix().to_string(),
    aliases: static_fs.aliases().to_vec(),
    files: nested_files(&assets(), static_fs.prefix())?,
    caching,
  };

  let router = Router::new()
    .route("/", get(pages::index))
    .layer(Extension(Arc::new(page)));

  Ok(static_fs.configure(router))
}

pub fn simple() -> Result<Router> {
  site(StaticFs::new(assets()), false)
}

pub fn aliasing() -> Result<Router> {
  site(StaticFs::new(assets()).with_root_aliases()?, false)
}

pub fn callbacks() -> Result<Router> {
  let static_fs = StaticFs::new(assets())
    .with_ok_callback(|ctx, _path| {
      ctx.header(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, max-age=3600"),
      );
    })
    .with_err_callback(|ctx, _err| {
      ctx.header(header::PRAGMA, HeaderValue::from_static("no-cache"));
      ctx.header(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, no-cache"),
      );
    });

  site(static_fs, true)
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::{Request, StatusCode}};
  use tower::ServiceExt;

  use super::*;

  #[test]
  fn nested_files_skip_top_level_entries() {
    let files = nested_files(&assets(), "static").unwrap();
    assert_eq!(files, vec!["css/styles.css", "js/scripts.js"]);
  }

  #[tokio::test]
  async fn aliasing_index_lists_aliases() {
    let response = aliasing()
      .unwrap()
      .oneshot(Request::get("/").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("/robots.txt → /static/robots.txt"));
    assert!(body.contains("/static/css/styles.css"));
  }

  #[tokio::test]
  async fn callbacks_set_cache_headers() {
    let found = callbacks()
      .unwrap()
      .oneshot(Request::get("/static/robots.txt").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(found.headers()[header::CACHE_CONTROL], "private, max-age=3600");

    let missing = callbacks()
      .unwrap()
      .oneshot(Request::get("/static/nope.txt").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.headers()[header::PRAGMA], "no-cache");
    assert_eq!(missing.headers()[header::CACHE_CONTROL], "private, no-cache");
  }

  #[tokio::test]
  async fn simple_has_no_aliases() {
    let response = simple()
      .unwrap()
      .oneshot(Request::get("/robots.txt").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }
}
