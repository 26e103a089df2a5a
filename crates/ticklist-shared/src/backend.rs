use std::cell::{
  Cell,
  RefCell
};
use std::collections::BTreeMap;

use anyhow::anyhow;

use crate::schema::Snapshot;

/// Where a database lives between
/// operations.
///
/// `save` must replace the persisted
/// database as a whole: either the new
/// snapshot is stored or the old one is
/// left in place.
pub trait StorageBackend {
  fn load(
    &self,
    database: &str
  ) -> anyhow::Result<Option<Snapshot>>;

  fn save(
    &self,
    database: &str,
    snapshot: &Snapshot
  ) -> anyhow::Result<()>;
}

impl<B: StorageBackend + ?Sized>
  StorageBackend for &B
{
  fn load(
    &self,
    database: &str
  ) -> anyhow::Result<Option<Snapshot>>
  {
    (**self).load(database)
  }

  fn save(
    &self,
    database: &str,
    snapshot: &Snapshot
  ) -> anyhow::Result<()> {
    (**self).save(database, snapshot)
  }
}

/// Process-local backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
  databases:  RefCell<
    BTreeMap<String, Snapshot>
  >,
  fail_saves: Cell<bool>
}

impl MemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes every following `save` fail
  /// until switched off again.
  pub fn set_fail_saves(
    &self,
    fail: bool
  ) {
    self.fail_saves.set(fail);
  }

  pub fn insert(
    &self,
    database: &str,
    snapshot: Snapshot
  ) {
    self
      .databases
      .borrow_mut()
      .insert(database.to_string(), snapshot);
  }

  pub fn remove(
    &self,
    database: &str
  ) -> Option<Snapshot> {
    self
      .databases
      .borrow_mut()
      .remove(database)
  }
}

impl StorageBackend for MemoryBackend {
  fn load(
    &self,
    database: &str
  ) -> anyhow::Result<Option<Snapshot>>
  {
    Ok(
      self
        .databases
        .borrow()
        .get(database)
        .cloned()
    )
  }

  fn save(
    &self,
    database: &str,
    snapshot: &Snapshot
  ) -> anyhow::Result<()> {
    if self.fail_saves.get() {
      return Err(anyhow!(
        "memory backend refused to save \
         {database}"
      ));
    }
    self.insert(database, snapshot.clone());
    Ok(())
  }
}
