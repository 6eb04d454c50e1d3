pub(crate) mod file_storage;
pub(crate) mod memory_storage;

use crate::SessionResult;

/// A single durable record holding the serialized identity.
///
/// Implementations only move bytes; validation happens in the store.
pub trait SessionStorage: Send + Sync {
    /// The raw record, or `None` if nothing is stored.
    fn read(&self) -> SessionResult<Option<String>>;

    /// Replace the record wholesale.
    fn write(&self, record: &str) -> SessionResult<()>;

    /// Delete the record. Removing an absent record succeeds.
    fn remove(&self) -> SessionResult<()>;
}
