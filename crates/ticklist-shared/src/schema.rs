//! Versioned database layout.
//!
//! A database holds at most one record
//! collection. Opening runs the upgrade
//! step when the persisted version is
//! older than the schema version (or
//! when nothing is persisted yet).

use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info
};

use crate::error::StoreError;
use crate::task::Task;

pub const DATABASE_NAME: &str =
  "ToDoListDB";
pub const SCHEMA_VERSION: u32 = 1;
pub const TASKS_STORE: &str = "tasks";

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct IndexSpec {
  pub name:     String,
  pub key_path: String,
  #[serde(default)]
  pub unique:   bool
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct StoreHeader {
  pub name:           String,
  pub key_path:       String,
  pub auto_increment: bool,
  pub next_key:       u64,
  #[serde(default)]
  pub indexes:        Vec<IndexSpec>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct DatabaseHeader {
  pub name:    String,
  pub version: u32,
  #[serde(default)]
  pub store:   Option<StoreHeader>
}

/// Everything a backend persists for
/// one database.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Snapshot {
  pub header:  DatabaseHeader,
  #[serde(default)]
  pub records: Vec<Task>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
  pub name:    String,
  pub version: u32,
  pub store:   String,
  pub key:     String,
  pub indexes: Vec<IndexSpec>
}

impl Default for Schema {
  fn default() -> Self {
    Self {
      name:    DATABASE_NAME.to_string(),
      version: SCHEMA_VERSION,
      store:   TASKS_STORE.to_string(),
      key:     "id".to_string(),
      indexes: vec![
        IndexSpec {
          name:     "task".to_string(),
          key_path: "task".to_string(),
          unique:   false
        },
        IndexSpec {
          name:     "completed"
            .to_string(),
          key_path: "completed"
            .to_string(),
          unique:   false
        },
      ]
    }
  }
}

/// Result of reconciling a persisted
/// snapshot with the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened {
  pub snapshot: Snapshot,
  pub upgraded: bool
}

impl Schema {
  pub fn empty_store(
    &self
  ) -> StoreHeader {
    StoreHeader {
      name:           self.store.clone(),
      key_path:       self.key.clone(),
      auto_increment: true,
      next_key:       1,
      indexes:        self
        .indexes
        .clone()
    }
  }

  #[tracing::instrument(skip(
    self, existing
  ), fields(db = %self.name))]
  pub fn open(
    &self,
    existing: Option<Snapshot>
  ) -> Result<Opened, StoreError> {
    let Some(mut snapshot) = existing
    else {
      info!(
        version = self.version,
        "creating database"
      );
      return Ok(Opened {
        snapshot: Snapshot {
          header:  DatabaseHeader {
            name:    self.name.clone(),
            version: self.version,
            store:   Some(
              self.empty_store()
            )
          },
          records: vec![]
        },
        upgraded: true
      });
    };

    let found = snapshot.header.version;
    if found > self.version {
      return Err(
        StoreError::VersionTooNew {
          found,
          supported: self.version
        }
      );
    }

    let mut upgraded = false;
    if found < self.version {
      info!(
        from = found,
        to = self.version,
        "upgrading database"
      );
      snapshot.header.version =
        self.version;
      upgraded = true;
    }

    match snapshot.header.store.as_mut()
    {
      | None => {
        if !snapshot.records.is_empty()
        {
          return Err(
            StoreError::CorruptDatabase(
              format!(
                "{} records without a \
                 '{}' collection",
                snapshot.records.len(),
                self.store
              )
            )
          );
        }
        info!(
          store = %self.store,
          "creating missing collection"
        );
        snapshot.header.store =
          Some(self.empty_store());
        upgraded = true;
      }
      | Some(store) => {
        if store.name != self.store {
          return Err(
            StoreError::CorruptDatabase(
              format!(
                "unexpected collection \
                 '{}'",
                store.name
              )
            )
          );
        }
        if upgraded {
          store.indexes =
            self.indexes.clone();
        }
        debug!(
          next_key = store.next_key,
          records =
            snapshot.records.len(),
          "opened existing collection"
        );
      }
    }

    Ok(Opened {
      snapshot,
      upgraded
    })
  }
}

#[cfg(test)]
mod tests {
  use super::{
    DatabaseHeader,
    Schema,
    Snapshot
  };
  use crate::error::StoreError;
  use crate::task::Task;

  #[test]
  fn open_without_snapshot_creates_versioned_collection()
   {
    let schema = Schema::default();
    let opened = schema
      .open(None)
      .expect("fresh open");

    assert!(opened.upgraded);
    assert_eq!(
      opened.snapshot.header.name,
      "ToDoListDB"
    );
    assert_eq!(
      opened.snapshot.header.version,
      1
    );
    let store = opened
      .snapshot
      .header
      .store
      .expect("collection created");
    assert_eq!(store.name, "tasks");
    assert_eq!(store.key_path, "id");
    assert!(store.auto_increment);
    assert_eq!(store.next_key, 1);
    let index_names: Vec<&str> = store
      .indexes
      .iter()
      .map(|idx| idx.name.as_str())
      .collect();
    assert_eq!(index_names, vec![
      "task",
      "completed"
    ]);
    assert!(
      store
        .indexes
        .iter()
        .all(|idx| !idx.unique)
    );
  }

  #[test]
  fn open_rejects_newer_version() {
    let schema = Schema::default();
    let mut snapshot = schema
      .open(None)
      .expect("fresh")
      .snapshot;
    snapshot.header.version = 2;

    let err = schema
      .open(Some(snapshot))
      .expect_err("newer version");
    assert_eq!(
      err,
      StoreError::VersionTooNew {
        found:     2,
        supported: 1
      }
    );
  }

  #[test]
  fn open_upgrades_version_zero_database()
   {
    let schema = Schema::default();
    let snapshot = Snapshot {
      header:  DatabaseHeader {
        name:    "ToDoListDB".to_string(),
        version: 0,
        store:   None
      },
      records: vec![]
    };

    let opened = schema
      .open(Some(snapshot))
      .expect("upgrade");
    assert!(opened.upgraded);
    assert_eq!(
      opened.snapshot.header.version,
      1
    );
    assert!(
      opened
        .snapshot
        .header
        .store
        .is_some()
    );
  }

  #[test]
  fn upgrade_keeps_records_and_redeclares_indices()
   {
    let schema = Schema::default();
    let mut store = schema.empty_store();
    store.next_key = 5;
    store.indexes.clear();
    let records = vec![
      Task {
        id:        1,
        text:      "Buy milk".to_string(),
        completed: true
      },
      Task {
        id:        4,
        text:      "Walk dog".to_string(),
        completed: false
      },
    ];
    let snapshot = Snapshot {
      header:  DatabaseHeader {
        name:    "ToDoListDB".to_string(),
        version: 0,
        store:   Some(store)
      },
      records: records.clone()
    };

    let opened = schema
      .open(Some(snapshot))
      .expect("upgrade");
    assert!(opened.upgraded);
    assert_eq!(
      opened.snapshot.header.version,
      1
    );
    assert_eq!(
      opened.snapshot.records,
      records
    );
    let store = opened
      .snapshot
      .header
      .store
      .expect("collection kept");
    assert_eq!(store.next_key, 5);
    let index_names: Vec<&str> = store
      .indexes
      .iter()
      .map(|idx| idx.name.as_str())
      .collect();
    assert_eq!(index_names, vec![
      "task",
      "completed"
    ]);
  }

  #[test]
  fn open_current_version_is_untouched()
   {
    let schema = Schema::default();
    let mut snapshot = schema
      .open(None)
      .expect("fresh")
      .snapshot;
    snapshot.records.push(Task {
      id:        1,
      text:      "a".to_string(),
      completed: false
    });
    if let Some(store) =
      snapshot.header.store.as_mut()
    {
      store.next_key = 2;
    }

    let opened = schema
      .open(Some(snapshot.clone()))
      .expect("reopen");
    assert!(!opened.upgraded);
    assert_eq!(opened.snapshot, snapshot);
  }

  #[test]
  fn records_without_collection_are_corrupt()
   {
    let schema = Schema::default();
    let snapshot = Snapshot {
      header:  DatabaseHeader {
        name:    "ToDoListDB".to_string(),
        version: 1,
        store:   None
      },
      records: vec![Task {
        id:        1,
        text:      "orphan".to_string(),
        completed: false
      }]
    };

    assert!(matches!(
      schema.open(Some(snapshot)),
      Err(StoreError::CorruptDatabase(_))
    ));
  }
}
