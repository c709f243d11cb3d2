//! Durable per-card progress storage with fail-open degradation.
//!
//! [`ProgressStore`] writes through a persistent [`ProgressBackend`]
//! (SQLite by default). The first time the backend cannot be opened, or any
//! read, write or clear fails, the store marks storage as unavailable and
//! serves every later call from a process-local [`MemoryBackend`]. Storage
//! faults are logged and absorbed here; callers only ever observe them
//! through [`ProgressStore::is_unavailable`].
//!
//! The unavailable flag ([`StorageHealth`]) is process-wide by default: it
//! describes the device, not a single store instance, and once set it stays
//! set for the rest of the process.

mod memory;
mod sqlite;

pub use memory::MemoryBackend;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::db::Database;
use crate::models::{ProgressMap, ProgressRecord};

/// Key-value storage of progress records by card id.
#[async_trait]
pub trait ProgressBackend: Send + Sync {
    async fn get(&self, card_id: &str) -> Result<Option<ProgressRecord>>;

    /// Insert or replace the record for `card_id`.
    async fn put(&self, card_id: &str, record: &ProgressRecord) -> Result<()>;

    /// Remove every record.
    async fn clear(&self) -> Result<()>;
}

/// Opens the persistent backend. Called at most once per store.
pub type BackendOpener = Box<dyn Fn() -> Result<Arc<dyn ProgressBackend>> + Send + Sync>;

/// Why the persistent backend was abandoned.
#[derive(Debug, Error)]
pub enum StorageFault {
    #[error("failed to open progress storage: {error:#}")]
    Init { error: anyhow::Error },

    #[error("progress storage {op} failed: {error:#}")]
    Op {
        op: &'static str,
        error: anyhow::Error,
    },
}

static PROCESS_STORAGE_UNAVAILABLE: AtomicBool = AtomicBool::new(false);

/// Handle to a write-once "storage unavailable" flag.
#[derive(Debug, Clone, Copy)]
pub struct StorageHealth {
    flag: &'static AtomicBool,
}

impl StorageHealth {
    /// The flag shared by the whole process.
    pub fn process() -> Self {
        Self {
            flag: &PROCESS_STORAGE_UNAVAILABLE,
        }
    }

    /// A fresh flag independent of the process-wide one.
    ///
    /// Each call leaks one `AtomicBool`; intended for a handful of
    /// independently embedded stores, such as in tests.
    pub fn detached() -> Self {
        Self {
            flag: Box::leak(Box::new(AtomicBool::new(false))),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn mark_unavailable(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl Default for StorageHealth {
    fn default() -> Self {
        Self::process()
    }
}

/// Whether persistent progress storage has failed at any point in this process.
pub fn is_storage_unavailable() -> bool {
    StorageHealth::process().is_unavailable()
}

pub struct ProgressStore {
    opener: BackendOpener,
    persistent: OnceCell<Option<Arc<dyn ProgressBackend>>>,
    memory: MemoryBackend,
    health: StorageHealth,
}

impl ProgressStore {
    pub fn new<F>(opener: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ProgressBackend>> + Send + Sync + 'static,
    {
        Self::with_health(opener, StorageHealth::process())
    }

    pub fn with_health<F>(opener: F, health: StorageHealth) -> Self
    where
        F: Fn() -> Result<Arc<dyn ProgressBackend>> + Send + Sync + 'static,
    {
        Self {
            opener: Box::new(opener),
            persistent: OnceCell::new(),
            memory: MemoryBackend::new(),
            health,
        }
    }

    /// Store persisting to the SQLite database at `path`.
    pub fn sqlite(path: PathBuf) -> Self {
        Self::new(sqlite_opener(path))
    }

    /// Store persisting to an already opened backend.
    pub fn with_backend(backend: Arc<dyn ProgressBackend>, health: StorageHealth) -> Self {
        Self::with_health(move || Ok(backend.clone()), health)
    }

    pub fn is_unavailable(&self) -> bool {
        self.health.is_unavailable()
    }

    /// Open the persistent backend. Idempotent; later calls are no-ops.
    pub async fn initialize(&self) {
        self.persistent
            .get_or_init(|| async {
                match (self.opener)() {
                    Ok(backend) => {
                        tracing::debug!("Persistent progress storage ready");
                        Some(backend)
                    }
                    Err(error) => {
                        self.degrade(StorageFault::Init { error });
                        None
                    }
                }
            })
            .await;
    }

    /// The persistent backend, unless storage has been marked unavailable.
    async fn persistent(&self) -> Option<Arc<dyn ProgressBackend>> {
        self.initialize().await;
        if self.health.is_unavailable() {
            return None;
        }
        self.persistent.get().cloned().flatten()
    }

    fn degrade(&self, fault: StorageFault) {
        tracing::warn!(error = %fault, "Progress will not persist; using in-memory storage");
        self.health.mark_unavailable();
    }

    pub async fn get(&self, card_id: &str) -> Option<ProgressRecord> {
        if let Some(backend) = self.persistent().await {
            match backend.get(card_id).await {
                Ok(record) => return record,
                Err(error) => self.degrade(StorageFault::Op { op: "get", error }),
            }
        }
        self.memory.read(card_id)
    }

    pub async fn put(&self, card_id: &str, record: ProgressRecord) {
        if let Some(backend) = self.persistent().await {
            match backend.put(card_id, &record).await {
                Ok(()) => return,
                Err(error) => self.degrade(StorageFault::Op { op: "put", error }),
            }
        }
        self.memory.write(card_id, record);
    }

    /// Records for the given ids. Ids without a stored record are omitted.
    pub async fn bulk_get<S: AsRef<str>>(&self, card_ids: &[S]) -> ProgressMap {
        if let Some(backend) = self.persistent().await {
            match read_many(backend.as_ref(), card_ids).await {
                Ok(map) => return map,
                Err(error) => self.degrade(StorageFault::Op {
                    op: "bulk_get",
                    error,
                }),
            }
        }

        card_ids
            .iter()
            .filter_map(|id| {
                let id = id.as_ref();
                self.memory.read(id).map(|record| (id.to_string(), record))
            })
            .collect()
    }

    /// Wipe all progress. The in-memory side is always cleared; a failure to
    /// clear the persistent side only marks storage unavailable.
    pub async fn reset_all(&self) {
        self.memory.wipe();
        if let Some(backend) = self.persistent().await {
            match backend.clear().await {
                Ok(()) => tracing::info!("All progress reset"),
                Err(error) => self.degrade(StorageFault::Op {
                    op: "reset_all",
                    error,
                }),
            }
        }
    }
}

/// Opener for a migrated SQLite database at `path`.
pub fn sqlite_opener(
    path: PathBuf,
) -> impl Fn() -> Result<Arc<dyn ProgressBackend>> + Send + Sync + 'static {
    move || {
        let db = Database::open(path.clone())?;
        db.migrate()?;
        Ok(Arc::new(db) as Arc<dyn ProgressBackend>)
    }
}

async fn read_many<S: AsRef<str>>(
    backend: &dyn ProgressBackend,
    card_ids: &[S],
) -> Result<ProgressMap> {
    let mut map = ProgressMap::with_capacity(card_ids.len());
    for id in card_ids {
        let id = id.as_ref();
        if let Some(record) = backend.get(id).await? {
            map.insert(id.to_string(), record);
        }
    }
    Ok(map)
}
