//! Entity adapter contract.
//!
//! The engine never inspects an entity's structure. Everything it needs is
//! asked for through two capabilities:
//!
//! - [`Stater`]: read and write the current state label
//! - [`Referable`]: name the collection the entity lives in and derive a
//!   stable reference key from its identity

use std::fmt::Display;
use thiserror::Error;

/// Separator placed between primary identity values in a reference key.
pub const REFERENCE_KEY_SEPARATOR: &str = "::";

/// Errors raised while deriving an entity's log reference.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceKeyError {
    #[error("entity has no primary identity values")]
    NoPrimaryValues,

    #[error("primary identity value {value:?} is empty or contains '::'")]
    AmbiguousComponent { value: String },

    #[error("entity has no table name")]
    MissingTable,

    #[error("cannot derive reference for entity: {0}")]
    Malformed(String),
}

/// Read and write access to an entity's current state label.
///
/// `set_state` is an in-memory assignment only; persisting the entity is the
/// caller's business.
///
/// # Example
///
/// ```rust
/// use transition::core::Stater;
///
/// let mut state = String::new();
/// assert_eq!(state.state(), "");
///
/// state.set_state("draft");
/// assert_eq!(state.state(), "draft");
/// ```
pub trait Stater {
    /// Current state label. Empty means "not started yet".
    fn state(&self) -> &str;

    /// Overwrite the current state label.
    fn set_state(&mut self, name: &str);
}

impl Stater for String {
    fn state(&self) -> &str {
        self.as_str()
    }

    fn set_state(&mut self, name: &str) {
        self.clear();
        self.push_str(name);
    }
}

/// Identity of an entity for change-log purposes.
///
/// Implementations must be deterministic: the same entity identity yields the
/// same key on every call, and distinct identities yield distinct keys.
/// [`reference_key`] builds a key that satisfies both from primary values.
///
/// `trigger` reads the reference before running any hook. An entity whose
/// identity is assigned while it is being persisted must be persisted before
/// it is triggered with a scope, otherwise its record is filed under the old
/// key.
///
/// # Example
///
/// ```rust
/// use transition::core::{reference_key, Referable, ReferenceKeyError};
///
/// struct Order {
///     id: u64,
/// }
///
/// impl Referable for Order {
///     fn table_name(&self) -> Result<String, ReferenceKeyError> {
///         Ok("orders".to_string())
///     }
///
///     fn reference_key(&self) -> Result<String, ReferenceKeyError> {
///         reference_key(&[&self.id])
///     }
/// }
///
/// let order = Order { id: 7 };
/// assert_eq!(order.reference_key().unwrap(), "7");
/// ```
pub trait Referable {
    /// Logical collection (table) name for the entity's type.
    fn table_name(&self) -> Result<String, ReferenceKeyError>;

    /// Stable identity string derived from the entity's primary values.
    fn reference_key(&self) -> Result<String, ReferenceKeyError>;
}

/// Join primary identity values into a reference key.
///
/// Values are rendered with `Display` and joined with `::`, so a composite key
/// `(42, "eu")` becomes `"42::eu"`. Values that render empty or contain the
/// separator are rejected, because they could make two identities collide.
///
/// # Example
///
/// ```rust
/// use transition::core::reference_key;
///
/// assert_eq!(reference_key(&[&42, &"eu"]).unwrap(), "42::eu");
/// assert!(reference_key(&[]).is_err());
/// assert!(reference_key(&[&"a::b"]).is_err());
/// ```
pub fn reference_key(primary_values: &[&dyn Display]) -> Result<String, ReferenceKeyError> {
    if primary_values.is_empty() {
        return Err(ReferenceKeyError::NoPrimaryValues);
    }

    let mut parts = Vec::with_capacity(primary_values.len());
    for value in primary_values {
        let rendered = value.to_string();
        if rendered.is_empty() || rendered.contains(REFERENCE_KEY_SEPARATOR) {
            return Err(ReferenceKeyError::AmbiguousComponent { value: rendered });
        }
        parts.push(rendered);
    }

    Ok(parts.join(REFERENCE_KEY_SEPARATOR))
}

/// The `(table, key)` pair a change-log record is filed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogReference {
    pub table: String,
    pub key: String,
}

impl LogReference {
    pub(crate) fn of<E: Referable + ?Sized>(entity: &E) -> Result<Self, ReferenceKeyError> {
        let table = entity.table_name()?;
        if table.is_empty() {
            return Err(ReferenceKeyError::MissingTable);
        }
        let key = entity.reference_key()?;
        Ok(Self { table, key })
    }
}
