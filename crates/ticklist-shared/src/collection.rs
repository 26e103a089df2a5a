use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::schema::{
  DatabaseHeader,
  Snapshot,
  StoreHeader
};
use crate::task::{
  NewTask,
  Task
};

/// In-memory view of the `tasks`
/// collection for the duration of one
/// operation. Records iterate in key
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStore {
  database: DatabaseHeader,
  header:   StoreHeader,
  records:  BTreeMap<u64, Task>
}

impl ObjectStore {
  pub fn from_snapshot(
    snapshot: Snapshot
  ) -> Result<Self, StoreError> {
    let Snapshot {
      mut header,
      records
    } = snapshot;
    let store =
      header.store.take().ok_or_else(
        || {
          StoreError::CorruptDatabase(
            "missing collection header"
              .to_string()
          )
        }
      )?;

    let mut map = BTreeMap::new();
    for task in records {
      if task.id == 0
        || task.id >= store.next_key
      {
        return Err(
          StoreError::CorruptDatabase(
            format!(
              "record key {} outside \
               generated range (next \
               key {})",
              task.id, store.next_key
            )
          )
        );
      }
      let id = task.id;
      if map.insert(id, task).is_some()
      {
        return Err(
          StoreError::CorruptDatabase(
            format!(
              "duplicate record key {id}"
            )
          )
        );
      }
    }

    Ok(Self {
      database: header,
      header:   store,
      records:  map
    })
  }

  pub fn into_snapshot(self) -> Snapshot {
    let mut header = self.database;
    header.store = Some(self.header);
    Snapshot {
      header,
      records: self
        .records
        .into_values()
        .collect()
    }
  }

  pub fn header(&self) -> &StoreHeader {
    &self.header
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Inserts with the next generated
  /// key. Keys are never handed out
  /// twice.
  pub fn add(
    &mut self,
    new_task: NewTask
  ) -> Task {
    let id = self.header.next_key;
    self.header.next_key += 1;
    let task = new_task.into_task(id);
    self.records.insert(id, task.clone());
    task
  }

  pub fn get(
    &self,
    id: u64
  ) -> Option<&Task> {
    self.records.get(&id)
  }

  pub fn get_all(&self) -> Vec<Task> {
    self.records.values().cloned().collect()
  }

  /// Replaces an existing record.
  pub fn put(
    &mut self,
    task: Task
  ) -> Result<(), StoreError> {
    match self.records.get_mut(&task.id) {
      | Some(slot) => {
        *slot = task;
        Ok(())
      }
      | None => {
        Err(StoreError::TaskNotFound {
          id: task.id
        })
      }
    }
  }

  pub fn delete(
    &mut self,
    id: u64
  ) -> bool {
    self.records.remove(&id).is_some()
  }

  /// Empties the collection. The key
  /// generator keeps counting.
  pub fn clear(&mut self) -> usize {
    let removed = self.records.len();
    self.records.clear();
    removed
  }
}
