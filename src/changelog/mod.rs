//! State change log: one immutable record per logged transition.
//!
//! The engine only ever appends records, through a [`ChangeLogScope`] supplied
//! to `trigger`. Reading them back goes through a [`ChangeLogStore`]. Both are
//! storage contracts; [`MemoryChangeLog`] is a thread-safe in-memory
//! implementation of the two.

use crate::core::{LogReference, Referable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

pub mod config;
pub mod error;
pub mod memory;

pub use config::ChangeLogConfig;
pub use error::{QueryError, StoreError};
pub use memory::{ChangeLogSnapshot, MemoryChangeLog, MemoryTransaction, SNAPSHOT_VERSION};

/// Record of a single state change of one entity.
///
/// Records are filed under `(refer_table, refer_id)`, the entity's table name
/// and reference key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChangeLog {
    /// Unique record identifier
    pub id: Uuid,
    /// Table (collection) name of the entity
    pub refer_table: String,
    /// Reference key of the entity
    pub refer_id: String,
    /// State before the transition
    pub from: String,
    /// State after the transition
    pub to: String,
    /// Free-text note supplied to `trigger`
    pub note: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Actor of the scope the record was written in, if any
    pub created_by: Option<String>,
}

impl StateChangeLog {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(
        refer_table: impl Into<String>,
        refer_id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            refer_table: refer_table.into(),
            refer_id: refer_id.into(),
            from: from.into(),
            to: to.into(),
            note: note.into(),
            created_at: Utc::now(),
            created_by: None,
        }
    }

    /// Set the actor responsible for the change.
    pub fn created_by(mut self, actor: Option<&str>) -> Self {
        self.created_by = actor.map(str::to_string);
        self
    }
}

/// Transactional scope a transition writes its record through.
///
/// The scope's atomicity is owned by the storage layer: if the scope is later
/// rolled back, records appended through it must disappear with it.
pub trait ChangeLogScope {
    /// Append a record within this scope.
    fn append(&mut self, record: StateChangeLog) -> Result<(), StoreError>;

    /// Actor stamped into `created_by` of records written through this scope.
    fn actor(&self) -> Option<&str> {
        None
    }
}

/// Read access to stored change logs.
pub trait ChangeLogStore {
    /// All records filed under `(table, key)`, oldest first.
    ///
    /// Age is the record's `created_at` stamp, not the order in which records
    /// reached the store. Records stamped by a wall clock that stepped
    /// backwards sort before the ones written earlier.
    fn records(&self, table: &str, key: &str) -> Result<Vec<StateChangeLog>, StoreError>;

    /// The newest record under `(table, key)` with a non-empty `to`.
    fn last(&self, table: &str, key: &str) -> Result<Option<StateChangeLog>, StoreError> {
        Ok(self
            .records(table, key)?
            .into_iter()
            .rev()
            .find(|record| !record.to.is_empty()))
    }
}

/// All change logs of `entity`, oldest first.
pub fn change_logs<E, S>(entity: &E, store: &S) -> Result<Vec<StateChangeLog>, QueryError>
where
    E: Referable + ?Sized,
    S: ChangeLogStore + ?Sized,
{
    let reference = LogReference::of(entity)?;
    Ok(store.records(&reference.table, &reference.key)?)
}

/// The last state change of `entity`, `None` if it was never logged.
pub fn last_state_change<E, S>(entity: &E, store: &S) -> Result<Option<StateChangeLog>, QueryError>
where
    E: Referable + ?Sized,
    S: ChangeLogStore + ?Sized,
{
    let reference = LogReference::of(entity)?;
    Ok(store.last(&reference.table, &reference.key)?)
}

/// Ordered change logs of one entity.
///
/// # Example
///
/// ```rust
/// use transition::changelog::{ChangeHistory, StateChangeLog};
///
/// let history = ChangeHistory::from(vec![
///     StateChangeLog::new("orders", "1", "draft", "checkout", ""),
///     StateChangeLog::new("orders", "1", "checkout", "paid", "pay note"),
/// ]);
///
/// assert_eq!(history.path(), vec!["draft", "checkout", "paid"]);
/// assert_eq!(history.last().unwrap().note, "pay note");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeHistory {
    records: Vec<StateChangeLog>,
}

impl ChangeHistory {
    /// Load the history of `entity` from `store`.
    pub fn load<E, S>(entity: &E, store: &S) -> Result<Self, QueryError>
    where
        E: Referable + ?Sized,
        S: ChangeLogStore + ?Sized,
    {
        change_logs(entity, store).map(Self::from)
    }

    /// States traversed: the first record's `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Time between the first and the last record, `None` if empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            last.created_at
                .signed_duration_since(first.created_at)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// Newest record with a non-empty `to`.
    pub fn last(&self) -> Option<&StateChangeLog> {
        self.records.iter().rev().find(|record| !record.to.is_empty())
    }

    /// Records oldest first.
    pub fn records(&self) -> &[StateChangeLog] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<StateChangeLog>> for ChangeHistory {
    fn from(records: Vec<StateChangeLog>) -> Self {
        Self { records }
    }
}
