use anyhow::Context;
use tracing::{
  debug,
  info
};

use crate::backend::StorageBackend;
use crate::collection::ObjectStore;
use crate::error::StoreError;
use crate::schema::Schema;
use crate::task::{
  NewTask,
  Task
};

pub const CLEAR_ALL_PROMPT: &str =
  "Are you sure you want to delete \
   everything?";

/// Blocking yes/no question asked
/// before destructive bulk operations.
pub trait Confirm {
  fn confirm(
    &self,
    message: &str
  ) -> bool;
}

impl<F> Confirm for F
where
  F: Fn(&str) -> bool
{
  fn confirm(
    &self,
    message: &str
  ) -> bool {
    self(message)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ClearOutcome {
  Declined,
  Cleared {
    removed: usize
  }
}

/// Handle to an opened task database.
///
/// Only [`TaskStore::open`] produces
/// one, so every operation runs against
/// an initialized database. The handle
/// caches nothing: each call loads the
/// persisted state, and writes persist
/// the whole database in one `save`.
#[derive(Debug)]
pub struct TaskStore<B> {
  backend: B,
  schema:  Schema
}

impl<B: StorageBackend> TaskStore<B> {
  pub fn open(
    backend: B
  ) -> anyhow::Result<Self> {
    Self::open_with_schema(
      backend,
      Schema::default()
    )
  }

  #[tracing::instrument(skip(
    backend, schema
  ), fields(db = %schema.name, version = schema.version))]
  pub fn open_with_schema(
    backend: B,
    schema: Schema
  ) -> anyhow::Result<Self> {
    let existing = backend
      .load(&schema.name)
      .with_context(|| {
        format!(
          "failed to load database {}",
          schema.name
        )
      })?;
    let opened = schema.open(existing)?;
    let store = ObjectStore::from_snapshot(
      opened.snapshot
    )?;

    if opened.upgraded {
      backend
        .save(
          &schema.name,
          &store.clone().into_snapshot()
        )
        .with_context(|| {
          format!(
            "failed to persist upgraded \
             database {}",
            schema.name
          )
        })?;
    }

    info!(
      records = store.len(),
      next_key = store.header().next_key,
      upgraded = opened.upgraded,
      "opened task database"
    );

    Ok(Self {
      backend,
      schema
    })
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  /// Inserts a task unless `raw` is
  /// blank, in which case nothing is
  /// written and `None` comes back.
  #[tracing::instrument(skip(
    self, raw
  ))]
  pub fn add(
    &self,
    raw: &str
  ) -> anyhow::Result<Option<Task>> {
    let Some(new_task) =
      NewTask::parse(raw)
    else {
      debug!("ignoring blank task text");
      return Ok(None);
    };

    let task = self.write(|store| {
      Ok(store.add(new_task))
    })?;
    info!(id = task.id, "task added");
    Ok(Some(task))
  }

  #[tracing::instrument(skip(self))]
  pub fn list(
    &self
  ) -> anyhow::Result<Vec<Task>> {
    let tasks = self.read()?.get_all();
    debug!(
      count = tasks.len(),
      "loaded tasks"
    );
    Ok(tasks)
  }

  #[tracing::instrument(skip(self))]
  pub fn get(
    &self,
    id: u64
  ) -> anyhow::Result<Option<Task>> {
    Ok(self.read()?.get(id).cloned())
  }

  #[tracing::instrument(skip(self))]
  pub fn set_completed(
    &self,
    id: u64,
    completed: bool
  ) -> anyhow::Result<Task> {
    let task = self.write(|store| {
      let mut task = store
        .get(id)
        .cloned()
        .ok_or(
          StoreError::TaskNotFound {
            id
          }
        )?;
      task.completed = completed;
      store.put(task.clone())?;
      Ok(task)
    })?;
    info!(
      id,
      completed, "task completion updated"
    );
    Ok(task)
  }

  #[tracing::instrument(skip(self))]
  pub fn toggle(
    &self,
    id: u64
  ) -> anyhow::Result<Task> {
    let current = self
      .get(id)?
      .ok_or(StoreError::TaskNotFound {
        id
      })?;
    self.set_completed(
      id,
      !current.completed
    )
  }

  /// Removes `id` if present. Absent
  /// ids are not an error.
  #[tracing::instrument(skip(self))]
  pub fn delete(
    &self,
    id: u64
  ) -> anyhow::Result<bool> {
    let removed = self
      .write(|store| Ok(store.delete(id)))?;
    if removed {
      info!(id, "task deleted");
    } else {
      debug!(id, "delete of absent task");
    }
    Ok(removed)
  }

  #[tracing::instrument(skip(
    self, confirm
  ))]
  pub fn clear<C>(
    &self,
    confirm: &C
  ) -> anyhow::Result<ClearOutcome>
  where
    C: Confirm + ?Sized
  {
    if !confirm.confirm(CLEAR_ALL_PROMPT) {
      info!("clear all declined");
      return Ok(ClearOutcome::Declined);
    }

    let removed =
      self.write(|store| Ok(store.clear()))?;
    info!(removed, "cleared all tasks");
    Ok(ClearOutcome::Cleared {
      removed
    })
  }

  fn read(
    &self
  ) -> anyhow::Result<ObjectStore> {
    let existing = self
      .backend
      .load(&self.schema.name)
      .with_context(|| {
        format!(
          "failed to load database {}",
          self.schema.name
        )
      })?;
    let opened =
      self.schema.open(existing)?;
    Ok(ObjectStore::from_snapshot(
      opened.snapshot
    )?)
  }

  fn write<T>(
    &self,
    op: impl FnOnce(
      &mut ObjectStore
    )
      -> Result<T, StoreError>
  ) -> anyhow::Result<T> {
    let mut store = self.read()?;
    let out = op(&mut store)?;
    self
      .backend
      .save(
        &self.schema.name,
        &store.into_snapshot()
      )
      .with_context(|| {
        format!(
          "failed to save database {}",
          self.schema.name
        )
      })?;
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::{
    CLEAR_ALL_PROMPT,
    ClearOutcome,
    TaskStore
  };
  use crate::backend::{
    MemoryBackend,
    StorageBackend
  };
  use crate::error::StoreError;

  fn texts(
    store: &TaskStore<&MemoryBackend>
  ) -> Vec<String> {
    store
      .list()
      .expect("list")
      .into_iter()
      .map(|task| task.text)
      .collect()
  }

  #[test]
  fn open_persists_fresh_database() {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");

    let snapshot = backend
      .load("ToDoListDB")
      .expect("load")
      .expect("persisted on open");
    assert_eq!(snapshot.header.version, 1);
    assert!(store.list().expect("list").is_empty());
  }

  #[test]
  fn add_then_reload_shows_single_entry()
  {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");

    let created = store
      .add("Buy milk")
      .expect("add")
      .expect("non-blank");
    assert!(!created.completed);

    let reopened = TaskStore::open(&backend)
      .expect("reopen");
    let tasks =
      reopened.list().expect("list");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "Buy milk");
    assert!(!tasks[0].completed);
    assert_eq!(tasks[0].id, created.id);
  }

  #[test]
  fn blank_add_leaves_list_unchanged() {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");
    store.add("keep").expect("add");

    assert_eq!(
      store.add("   \t ").expect("add"),
      None
    );
    assert_eq!(texts(&store), vec!["keep"]);
  }

  #[test]
  fn add_trims_text() {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");
    store
      .add("  padded  ")
      .expect("add");
    assert_eq!(texts(&store), vec![
      "padded"
    ]);
  }

  #[test]
  fn set_completed_touches_only_target()
  {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");
    for text in ["a", "b", "c"] {
      store.add(text).expect("add");
    }

    let updated = store
      .set_completed(2, true)
      .expect("update");
    assert!(updated.completed);

    let flags: Vec<(u64, bool)> = store
      .list()
      .expect("list")
      .into_iter()
      .map(|task| (task.id, task.completed))
      .collect();
    assert_eq!(flags, vec![
      (1, false),
      (2, true),
      (3, false)
    ]);

    let toggled =
      store.toggle(2).expect("toggle");
    assert!(!toggled.completed);
  }

  #[test]
  fn set_completed_on_missing_id_fails_cleanly()
   {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");
    store.add("only").expect("add");

    let err = store
      .set_completed(42, true)
      .expect_err("missing id");
    assert_eq!(
      err.downcast_ref::<StoreError>(),
      Some(&StoreError::TaskNotFound {
        id: 42
      })
    );
    assert_eq!(texts(&store), vec!["only"]);
  }

  #[test]
  fn delete_is_idempotent() {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");
    store.add("a").expect("add");
    store.add("b").expect("add");

    assert!(store.delete(1).expect("delete"));
    assert!(!store.delete(1).expect("again"));
    assert!(!store.delete(99).expect("absent"));
    assert_eq!(texts(&store), vec!["b"]);
  }

  #[test]
  fn clear_respects_confirmation() {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");
    store.add("a").expect("add");
    store.add("b").expect("add");

    let declined = store
      .clear(&|message: &str| {
        assert_eq!(message, CLEAR_ALL_PROMPT);
        false
      })
      .expect("clear");
    assert_eq!(declined, ClearOutcome::Declined);
    assert_eq!(texts(&store).len(), 2);

    let cleared = store
      .clear(&|_: &str| true)
      .expect("clear");
    assert_eq!(
      cleared,
      ClearOutcome::Cleared { removed: 2 }
    );
    assert!(texts(&store).is_empty());

    let next = store
      .add("after")
      .expect("add")
      .expect("non-blank");
    assert_eq!(next.id, 3);
  }

  #[test]
  fn failed_save_leaves_state_unchanged()
  {
    let backend = MemoryBackend::new();
    let store = TaskStore::open(&backend)
      .expect("open");
    store.add("stable").expect("add");

    backend.set_fail_saves(true);
    assert!(store.add("lost").is_err());
    assert!(store.delete(1).is_err());
    backend.set_fail_saves(false);

    assert_eq!(texts(&store), vec!["stable"]);
  }

  #[test]
  fn operations_see_external_changes() {
    let backend = MemoryBackend::new();
    let first = TaskStore::open(&backend)
      .expect("open");
    let second = TaskStore::open(&backend)
      .expect("open");

    first.add("from first").expect("add");
    assert_eq!(texts(&second), vec![
      "from first"
    ]);

    backend.remove("ToDoListDB");
    assert!(texts(&first).is_empty());
  }
}
