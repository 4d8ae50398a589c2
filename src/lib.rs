//! Serve files embedded in the binary through [axum](axum) routes.
//!
//! ```no_run
//! use rust_embed::RustEmbed;
//! use staticfs::{Embedded, StaticFs};
//!
//! #[derive(RustEmbed)]
//! #[folder = "demos/"]
//! struct Assets;
//!
//! # fn main() -> staticfs::Result<()> {
//! let router: axum::Router = StaticFs::new(Embedded::<Assets>::new())
//!   .with_root_aliases()?
//!   .router();
//! # Ok(())
//! # }
//! ```
//!
//! With `demos/static/robots.txt` embedded, the router answers both
//! `/static/robots.txt` and `/robots.txt`.

pub mod embedded;
pub mod file_server;
pub mod path;
pub mod static_fs;
mod util;

pub use embedded::{DirEntry, Embedded, EmbeddedFs, Entry, File};
pub use file_server::FileServer;
pub use static_fs::{Alias, Context, ErrCallback, OkCallback, StaticFs, DEFAULT_PREFIX};
pub use util::{Error, Result};
