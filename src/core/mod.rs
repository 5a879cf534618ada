//! Core contracts shared by the definition model and the trigger engine.
//!
//! - The entity adapter (`Stater`, `Referable`) through which the engine
//!   reads and writes state and derives log references
//! - Hooks, the callbacks attached to states and transitions
//!
//! Nothing in this module inspects entity structure; entities opt in by
//! implementing the adapter traits.

mod entity;
mod hook;

pub(crate) use entity::LogReference;
pub use entity::{reference_key, ReferenceKeyError, Referable, Stater, REFERENCE_KEY_SEPARATOR};
pub use hook::{BoxError, Hook, HookPhase, HookResult};
