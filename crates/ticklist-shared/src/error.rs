use thiserror::Error;

/// Failures the store itself can
/// detect. Backend I/O errors travel as
/// plain `anyhow` errors with context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
  #[error(
    "database version {found} is \
     newer than supported version \
     {supported}"
  )]
  VersionTooNew {
    found:     u32,
    supported: u32
  },

  #[error("task not found: {id}")]
  TaskNotFound { id: u64 },

  #[error("corrupt database: {0}")]
  CorruptDatabase(String)
}
