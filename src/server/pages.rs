use std::sync::Arc;

use axum::Extension;
use maud::{html, Markup, DOCTYPE};

use staticfs::Alias;

/// What the demo index page lists.
pub struct IndexPage {
  pub prefix: String,
  pub aliases: Vec<Alias>,
  /// Files below subdirectories of the prefix, relative to it.
  pub files: Vec<String>,
  pub caching: bool,
}

pub async fn index(Extension(page): Extension<Arc<IndexPage>>) -> Markup {
  let prefix = &page.prefix;
  let has_alias = |name: &str| page.aliases.iter().any(|alias| alias.name() == name);

  html! {
    (DOCTYPE)
    html lang="en" {
      head {
        meta charset="UTF-8";
        title { "staticfs" }
        @if has_alias("favicon.svg") {
          link rel="icon" type="image/svg+xml" href="/favicon.svg";
        }
        @if has_alias("site.webmanifest") {
          link rel="manifest" href="/site.webmanifest";
        }
        link rel="stylesheet" type="text/css" href={ "/" (prefix) "/css/styles.css" };
      }
      body {
        h1 { "staticfs" }

        @if !page.aliases.is_empty() {
          h2 { "Aliased Files" }
          ul {
            @for alias in &page.aliases {
              li {
                a href=(alias) { (alias) " → /" (prefix) (alias) }
              }
            }
          }
        }

        h2 { "Files" }
        ul {
          @for file in &page.files {
            li {
              a href={ "/" (prefix) "/" (file) } { "/" (prefix) "/" (file) }
            }
          }
        }

        @if page.caching {
          h2 { "Caching" }
          p {
            "Resources that are found are cached for 3600 seconds; "
            "resources that are not found have an explicit no-cache header."
          }
        }

        script src={ "/" (prefix) "/js/scripts.js" } {}
      }
    }
  }
}
