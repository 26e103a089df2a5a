pub mod backend;
pub mod collection;
pub mod error;
pub mod schema;
pub mod store;
pub mod task;
pub mod view;

pub use backend::{
  MemoryBackend,
  StorageBackend
};
pub use error::StoreError;
pub use schema::{
  DATABASE_NAME,
  SCHEMA_VERSION,
  Schema,
  Snapshot
};
pub use store::{
  CLEAR_ALL_PROMPT,
  ClearOutcome,
  Confirm,
  TaskStore
};
pub use task::{
  NewTask,
  Task
};
pub use view::{
  Checklist,
  ChecklistRow,
  Gesture,
  InteractionMode
};
