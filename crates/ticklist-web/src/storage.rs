use anyhow::{
  Context,
  anyhow
};
use ticklist_shared::{
  InteractionMode,
  Snapshot,
  StorageBackend
};
use wasm_bindgen::JsValue;
use web_sys::Storage;

const DATABASE_KEY_PREFIX: &str =
  "ticklist:";
const INTERACTION_STORAGE_KEY: &str =
  "ticklist.interaction";

/// Keeps each database as one JSON
/// value in `window.localStorage`, so a
/// save is a single `setItem`.
#[derive(Debug, Clone)]
pub struct LocalStorageBackend {
  storage: Storage
}

impl LocalStorageBackend {
  pub fn open() -> anyhow::Result<Self> {
    let window = web_sys::window()
      .ok_or_else(|| {
        anyhow!("no window available")
      })?;
    let storage = window
      .local_storage()
      .map_err(js_error)
      .context(
        "local storage access denied"
      )?
      .ok_or_else(|| {
        anyhow!(
          "local storage unavailable"
        )
      })?;
    Ok(Self { storage })
  }
}

impl StorageBackend
  for LocalStorageBackend
{
  fn load(
    &self,
    database: &str
  ) -> anyhow::Result<Option<Snapshot>>
  {
    let key = database_key(database);
    let raw = self
      .storage
      .get_item(&key)
      .map_err(js_error)
      .with_context(|| {
        format!("failed reading {key}")
      })?;

    match raw {
      | Some(raw) => {
        decode_snapshot(&raw)
          .map(Some)
          .with_context(|| {
            format!(
              "failed parsing {key}"
            )
          })
      }
      | None => Ok(None)
    }
  }

  fn save(
    &self,
    database: &str,
    snapshot: &Snapshot
  ) -> anyhow::Result<()> {
    let key = database_key(database);
    let raw = encode_snapshot(snapshot)?;
    self
      .storage
      .set_item(&key, &raw)
      .map_err(js_error)
      .with_context(|| {
        format!("failed writing {key}")
      })
  }
}

pub fn load_interaction_mode()
-> InteractionMode {
  let stored = web_sys::window()
    .and_then(|window| {
      window
        .local_storage()
        .ok()
        .flatten()
    })
    .and_then(|storage| {
      storage
        .get_item(
          INTERACTION_STORAGE_KEY
        )
        .ok()
        .flatten()
    });

  stored
    .as_deref()
    .and_then(
      InteractionMode::from_storage_value
    )
    .unwrap_or_default()
}

pub fn save_interaction_mode(
  mode: InteractionMode
) {
  if let Some(storage) =
    web_sys::window().and_then(
      |window| {
        window
          .local_storage()
          .ok()
          .flatten()
      }
    )
    && let Err(error) = storage.set_item(
      INTERACTION_STORAGE_KEY,
      mode.storage_value()
    )
  {
    tracing::warn!(
      ?error,
      "failed saving interaction mode"
    );
  }
}

fn database_key(
  database: &str
) -> String {
  format!(
    "{DATABASE_KEY_PREFIX}{database}"
  )
}

fn encode_snapshot(
  snapshot: &Snapshot
) -> anyhow::Result<String> {
  Ok(serde_json::to_string(snapshot)?)
}

fn decode_snapshot(
  raw: &str
) -> anyhow::Result<Snapshot> {
  Ok(serde_json::from_str(raw)?)
}

fn js_error(
  err: JsValue
) -> anyhow::Error {
  anyhow!("{err:?}")
}

#[cfg(test)]
mod tests {
  use ticklist_shared::{
    Schema,
    Task
  };

  use super::{
    database_key,
    decode_snapshot,
    encode_snapshot
  };

  #[test]
  fn key_is_namespaced() {
    assert_eq!(
      database_key("ToDoListDB"),
      "ticklist:ToDoListDB"
    );
  }

  #[test]
  fn snapshot_json_shape() {
    let mut snapshot = Schema::default()
      .open(None)
      .expect("fresh")
      .snapshot;
    snapshot.records.push(Task {
      id:        1,
      text:      "Buy milk".to_string(),
      completed: false
    });

    let raw = encode_snapshot(&snapshot)
      .expect("encode");
    let value: serde_json::Value =
      serde_json::from_str(&raw)
        .expect("json");
    assert_eq!(
      value["header"]["version"],
      1
    );
    assert_eq!(
      value["records"][0]["task"],
      "Buy milk"
    );
    assert_eq!(
      decode_snapshot(&raw)
        .expect("decode"),
      snapshot
    );
  }

  #[test]
  fn garbage_is_rejected() {
    assert!(
      decode_snapshot("not json")
        .is_err()
    );
  }
}
