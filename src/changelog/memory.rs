//! In-memory change log with transactional scopes and snapshots.

use crate::changelog::config::ChangeLogConfig;
use crate::changelog::error::StoreError;
use crate::changelog::{ChangeLogScope, ChangeLogStore, StateChangeLog};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Row>,
    next_sort_key: u64,
}

#[derive(Debug)]
struct Row {
    sort_key: u64,
    record: StateChangeLog,
}

impl Table {
    fn insert(&mut self, record: StateChangeLog) {
        self.next_sort_key += 1;
        self.rows.push(Row {
            sort_key: self.next_sort_key,
            record,
        });
    }
}

/// Thread-safe in-memory change log.
///
/// Records are written through [`MemoryTransaction`]s opened with
/// [`begin`](Self::begin) and only become visible when the transaction is
/// committed. Cloning the log yields another handle to the same records.
///
/// # Example
///
/// ```rust
/// use transition::changelog::{ChangeLogScope, ChangeLogStore, MemoryChangeLog, StateChangeLog};
///
/// let log = MemoryChangeLog::new();
/// let mut tx = log.begin();
/// tx.append(StateChangeLog::new("orders", "1", "draft", "checkout", "")).unwrap();
/// assert!(log.records("orders", "1").unwrap().is_empty());
///
/// tx.commit();
/// assert_eq!(log.records("orders", "1").unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryChangeLog {
    config: Arc<ChangeLogConfig>,
    table: Arc<RwLock<Table>>,
}

impl MemoryChangeLog {
    /// Create an empty log with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log with a custom configuration.
    pub fn with_config(config: ChangeLogConfig) -> Self {
        Self {
            config: Arc::new(config),
            table: Arc::default(),
        }
    }

    /// Configuration applied to appends.
    pub fn config(&self) -> &ChangeLogConfig {
        &self.config
    }

    /// Open a transaction with no actor.
    pub fn begin(&self) -> MemoryTransaction {
        MemoryTransaction {
            log: self.clone(),
            pending: Vec::new(),
            actor: None,
        }
    }

    /// Open a transaction whose records are stamped with `actor`.
    pub fn begin_as(&self, actor: impl Into<String>) -> MemoryTransaction {
        MemoryTransaction {
            actor: Some(actor.into()),
            ..self.begin()
        }
    }

    /// Number of committed records.
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    /// Whether nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capture every committed record, in commit order.
    pub fn snapshot(&self) -> ChangeLogSnapshot {
        let table = self.table.read();
        ChangeLogSnapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            records: table.rows.iter().map(|row| row.record.clone()).collect(),
        }
    }

    /// Rebuild a log from a snapshot.
    pub fn restore(
        snapshot: ChangeLogSnapshot,
        config: ChangeLogConfig,
    ) -> Result<Self, StoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let log = Self::with_config(config);
        {
            let mut table = log.table.write();
            for record in snapshot.records {
                table.insert(record);
            }
        }
        debug!(
            snapshot = %snapshot.id,
            records = log.len(),
            "Restored change log from snapshot"
        );
        Ok(log)
    }
}

impl ChangeLogStore for MemoryChangeLog {
    /// Records sorted by `created_at`. Only records with equal timestamps fall
    /// back to commit order.
    fn records(&self, table: &str, key: &str) -> Result<Vec<StateChangeLog>, StoreError> {
        let guard = self.table.read();
        let mut rows: Vec<&Row> = guard
            .rows
            .iter()
            .filter(|row| row.record.refer_table == table && row.record.refer_id == key)
            .collect();
        rows.sort_by_key(|row| (row.record.created_at, row.sort_key));
        Ok(rows.into_iter().map(|row| row.record.clone()).collect())
    }
}

/// A unit of work against a [`MemoryChangeLog`].
///
/// Appended records are buffered until [`commit`](Self::commit). Dropping the
/// transaction without committing discards them.
#[derive(Debug)]
pub struct MemoryTransaction {
    log: MemoryChangeLog,
    pending: Vec<StateChangeLog>,
    actor: Option<String>,
}

impl MemoryTransaction {
    /// Records appended but not yet committed.
    pub fn pending(&self) -> &[StateChangeLog] {
        &self.pending
    }

    /// Publish all pending records at once. Returns how many were written.
    pub fn commit(self) -> usize {
        let count = self.pending.len();
        {
            let mut table = self.log.table.write();
            for record in self.pending {
                table.insert(record);
            }
        }
        debug!(records = count, "Committed change log transaction");
        count
    }

    /// Discard all pending records. Returns how many were dropped.
    pub fn rollback(self) -> usize {
        let count = self.pending.len();
        debug!(records = count, "Rolled back change log transaction");
        count
    }
}

impl ChangeLogScope for MemoryTransaction {
    fn append(&mut self, record: StateChangeLog) -> Result<(), StoreError> {
        let limit = self.log.config.note_limit;
        if record.note.len() > limit {
            return Err(StoreError::NoteTooLong {
                len: record.note.len(),
                limit,
            });
        }
        self.pending.push(record);
        Ok(())
    }

    fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}

/// Serializable copy of a [`MemoryChangeLog`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Committed records in commit order
    pub records: Vec<StateChangeLog>,
}

impl ChangeLogSnapshot {
    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::SerializationFailed(e.to_string()))
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::DeserializationFailed(e.to_string()))
    }

    /// Serialize snapshot to binary format (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(self).map_err(|e| StoreError::SerializationFailed(e.to_string()))
    }

    /// Deserialize snapshot from binary format (bincode).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        bincode::deserialize(bytes).map_err(|e| StoreError::DeserializationFailed(e.to_string()))
    }
}
