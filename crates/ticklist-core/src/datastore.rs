use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use ticklist_shared::schema::{DatabaseHeader, Snapshot};
use ticklist_shared::{StorageBackend, Task, TaskStore};

/// Task database opened from a data directory.
pub type DataStore = TaskStore<FileBackend>;

/// Keeps each database in `<data_dir>/<name>.data` as JSON lines: the
/// database header first, then one record per line.
#[derive(Debug, Clone)]
pub struct FileBackend {
    pub data_dir: PathBuf,
}

impl FileBackend {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened file backend");
        Ok(Self { data_dir })
    }

    pub fn database_path(&self, database: &str) -> PathBuf {
        self.data_dir.join(format!("{database}.data"))
    }
}

impl StorageBackend for FileBackend {
    #[tracing::instrument(skip(self))]
    fn load(&self, database: &str) -> anyhow::Result<Option<Snapshot>> {
        let path = self.database_path(database);
        if !path.exists() {
            debug!(file = %path.display(), "database file absent");
            return Ok(None);
        }
        load_jsonl(&path).with_context(|| format!("failed to load {}", path.display()))
    }

    #[tracing::instrument(skip(self, snapshot), fields(records = snapshot.records.len()))]
    fn save(&self, database: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        let path = self.database_path(database);
        save_jsonl_atomic(&path, snapshot)
            .with_context(|| format!("failed to save {}", path.display()))
    }
}

/// Opens (creating if needed) the task database under `data_dir`.
pub fn open_data_dir(data_dir: &Path) -> anyhow::Result<DataStore> {
    let backend = FileBackend::open(data_dir)?;
    TaskStore::open(backend)
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Option<Snapshot>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut header: Option<DatabaseHeader> = None;
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if header.is_none() {
            let parsed: DatabaseHeader = serde_json::from_str(trimmed).with_context(|| {
                format!("failed parsing header at {} line {}", path.display(), idx + 1)
            })?;
            header = Some(parsed);
            continue;
        }

        let task: Task = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        records.push(task);
    }

    let Some(header) = header else {
        debug!(file = %path.display(), "database file empty");
        return Ok(None);
    };

    debug!(count = records.len(), "loaded records from jsonl");
    Ok(Some(Snapshot { header, records }))
}

#[tracing::instrument(skip(path, snapshot))]
fn save_jsonl_atomic(path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    debug!(
        file = %path.display(),
        count = snapshot.records.len(),
        "saving jsonl atomically"
    );

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    writeln!(temp, "{}", serde_json::to_string(&snapshot.header)?)?;
    for task in &snapshot.records {
        let serialized = serde_json::to_string(task)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
