use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("file does not exist: {0}")]
  NotFound(String),

  #[error("is a directory: {0}")]
  IsDirectory(String),

  #[error("not a directory: {0}")]
  NotDirectory(String),

  #[error("hyper error: {0}")]
  Hyper(#[from] hyper::Error),
}

impl Error {
  /// Resolution failures that a client only ever sees as 404.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::NotFound(_) | Error::IsDirectory(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
