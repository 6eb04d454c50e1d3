//! Client-side session layer for the Recette API.
//!
//! [`SessionStore`] owns the signed-in [`Identity`] and its durable copy;
//! [`Reconciler`] completes a partially known identity against the server's
//! identity endpoint and signs out when the server rejects it.

mod epoch;
mod error;
mod identity;
mod identity_lookup;
mod reconciler;
mod session_state;
mod storage;
mod store;

#[cfg(test)]
mod tests;

pub use epoch::Epoch;
pub use error::{SessionError, SessionResult};
pub use identity::{Identity, coerce_user_id};
pub use identity_lookup::IdentityLookup;
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use session_state::SessionState;
pub use storage::{
    SessionStorage, file_storage::FileStorage, memory_storage::MemoryStorage,
};
pub use store::{SessionStore, Snapshot};
