//! Read-only view over a tree of files bundled into the binary.
//!
//! [`EmbeddedFs`] is the seam the rest of the crate talks to. [`Embedded`]
//! implements it for any [`RustEmbed`] type, deriving the directory
//! structure from the embedded file names.

use std::{
  borrow::Cow,
  collections::{BTreeMap, BTreeSet},
  marker::PhantomData,
};

use rust_embed::RustEmbed;

use crate::util::{Error, Result};

pub trait EmbeddedFs: Send + Sync + 'static {
  /// Opens `path`, relative to the root. A leading `/` is ignored and the
  /// empty path names the root directory.
  fn open(&self, path: &str) -> Result<Entry>;

  /// Lists the immediate entries of the directory at `path`, sorted by
  /// name.
  fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>>;
}

#[derive(Debug)]
pub enum Entry {
  File(File),
  Dir,
}

impl Entry {
  pub fn is_dir(&self) -> bool {
    matches!(self, Entry::Dir)
  }
}

#[derive(Debug, Clone)]
pub struct File {
  path: String,
  data: Cow<'static, [u8]>,
  sha256: [u8; 32],
  last_modified: Option<u64>,
}

impl File {
  pub fn new(
    path: impl Into<String>,
    data: Cow<'static, [u8]>,
    sha256: [u8; 32],
    last_modified: Option<u64>,
  ) -> Self {
    Self {
      path: path.into(),
      data,
      sha256,
      last_modified,
    }
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn into_data(self) -> Cow<'static, [u8]> {
    self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn sha256(&self) -> &[u8; 32] {
    &self.sha256
  }

  /// Seconds since the unix epoch, when the embedding recorded one.
  pub fn last_modified(&self) -> Option<u64> {
    self.last_modified
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
  pub name: String,
  pub is_dir: bool,
}

/// [`EmbeddedFs`] backed by a `#[derive(RustEmbed)]` type.
pub struct Embedded<E> {
  dirs: BTreeSet<String>,
  _embed: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> Embedded<E> {
  pub fn new() -> Self {
    let mut dirs = BTreeSet::new();
    dirs.insert(String::new());

    for name in E::iter() {
      let mut parent = name.as_ref();
      while let Some((dir, _)) = parent.rsplit_once('/') {
        dirs.insert(dir.to_string());
        parent = dir;
      }
    }

    Self {
      dirs,
      _embed: PhantomData,
    }
  }
}

impl<E: RustEmbed> Default for Embedded<E> {
  fn default() -> Self {
    Self::new()
  }
}

fn normalize(path: &str) -> &str {
  path.trim_matches('/')
}

impl<E: RustEmbed + 'static> EmbeddedFs for Embedded<E> {
  fn open(&self, path: &str) -> Result<Entry> {
    let path = normalize(path);

    if self.dirs.contains(path) {
      return Ok(Entry::Dir);
    }

    match E::get(path) {
      Some(file) => Ok(Entry::File(File::new(
        path,
        file.data,
        file.metadata.sha256_hash(),
        file.metadata.last_modified(),
      ))),
      None => Err(Error::NotFound(path.to_string())),
    }
  }

  fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
    let path = normalize(path);

    if !self.dirs.contains(path) {
      return match E::get(path) {
        Some(_) => Err(Error::NotDirectory(path.to_string())),
        None => Err(Error::NotFound(path.to_string())),
      };
    }

    let prefix = if path.is_empty() {
      String::new()
    } else {
      format!("{path}/")
    };

    // name -> is_dir
    let mut entries: BTreeMap<String, bool> = BTreeMap::new();
    for name in E::iter() {
      let Some(rest) = name.strip_prefix(prefix.as_str()) else {
        continue;
      };
      match rest.split_once('/') {
        Some((dir, _)) => {
          entries.insert(dir.to_string(), true);
        }
        None => {
          entries.entry(rest.to_string()).or_insert(false);
        }
      }
    }

    Ok(
      entries
        .into_iter()
        .map(|(name, is_dir)| DirEntry { name, is_dir })
        .collect(),
    )
  }
}
