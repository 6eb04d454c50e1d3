use crate::{Epoch, Identity, SessionError, SessionResult, SessionState, SessionStorage};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use tokio::sync::watch;

/// The current identity together with the epoch it was observed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub identity: Option<Identity>,
    pub epoch: Epoch,
}

impl Snapshot {
    pub fn state(&self) -> SessionState {
        SessionState::of(self.identity.as_ref())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    identity: Option<Identity>,
    epoch: Epoch,
}

/// Single owner of the signed-in identity and its durable copy.
///
/// `hydrate` runs once at start-up, `login` and `logout` are the only
/// mutators, `current` is the only read path. Share it behind an `Arc`.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: Mutex<StoreState>,
    epochs: watch::Sender<Epoch>,
}

impl SessionStore {
    /// An empty store over `storage`. Call [`SessionStore::hydrate`] to load
    /// the persisted identity.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (epochs, _) = watch::channel(Epoch::default());
        Self {
            storage,
            state: Mutex::new(StoreState::default()),
            epochs,
        }
    }

    /// Create a store and hydrate it in one step.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Load the durable record into memory.
    ///
    /// Unreadable or invalid records resolve to `None` and are left on disk
    /// as they are; only `login` and `logout` rewrite the record.
    pub fn hydrate(&self) -> Option<Identity> {
        let identity = match self.storage.read() {
            Ok(Some(raw)) => {
                let parsed = Identity::from_json(&raw);
                if parsed.is_none() {
                    warn!("Ignoring invalid session record");
                }
                parsed
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read session record: {e}");
                None
            }
        };

        let mut state = self.lock();
        state.identity = identity.clone();
        self.advance(&mut state);

        match &identity {
            Some(identity) => info!(
                "Hydrated session for {} ({:?})",
                identity.email,
                SessionState::of(Some(identity))
            ),
            None => debug!("No session to hydrate"),
        }

        identity
    }

    /// Replace the current identity with `identity`, normalized, and persist it.
    ///
    /// Returns the normalized identity, which is exactly what `current()`
    /// reports afterwards. Memory is only updated once the record is written.
    pub fn login(&self, identity: Identity) -> SessionResult<Identity> {
        let mut state = self.lock();
        self.login_locked(&mut state, identity)
    }

    /// Forget the current identity and delete the durable record.
    ///
    /// Memory is cleared even when deleting the record fails.
    pub fn logout(&self) -> SessionResult<()> {
        let mut state = self.lock();
        self.logout_locked(&mut state)
    }

    /// The current identity. No side effects.
    pub fn current(&self) -> Option<Identity> {
        self.lock().identity.clone()
    }

    /// The current identity and its epoch, read atomically.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            identity: state.identity.clone(),
            epoch: state.epoch,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.lock().epoch
    }

    /// Bearer token of the current identity, if any.
    pub fn token(&self) -> Option<String> {
        self.lock()
            .identity
            .as_ref()
            .map(|identity| identity.token.clone())
    }

    /// Notified with the new epoch after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Epoch> {
        self.epochs.subscribe()
    }

    /// `login` that only applies while `epoch` is still current.
    ///
    /// Returns the committed snapshot, or `None` if the identity moved on.
    pub fn login_if_current(
        &self,
        epoch: Epoch,
        identity: Identity,
    ) -> SessionResult<Option<Snapshot>> {
        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("Discarding stale login for epoch {}", epoch.value());
            return Ok(None);
        }

        let identity = self.login_locked(&mut state, identity)?;
        Ok(Some(Snapshot {
            identity: Some(identity),
            epoch: state.epoch,
        }))
    }

    /// `logout` that only applies while `epoch` is still current.
    ///
    /// Returns whether the session was cleared.
    pub fn logout_if_current(&self, epoch: Epoch) -> SessionResult<bool> {
        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("Discarding stale logout for epoch {}", epoch.value());
            return Ok(false);
        }

        self.logout_locked(&mut state)?;
        Ok(true)
    }

    fn login_locked(&self, state: &mut StoreState, identity: Identity) -> SessionResult<Identity> {
        let identity = identity
            .normalize()
            .ok_or_else(|| SessionError::invalid_identity("token and email are required"))?;

        let record = serde_json::to_string_pretty(&identity)?;
        self.storage.write(&record)?;

        state.identity = Some(identity.clone());
        self.advance(state);

        info!("Signed in as {}", identity.email);
        Ok(identity)
    }

    fn logout_locked(&self, state: &mut StoreState) -> SessionResult<()> {
        let had_identity = state.identity.take().is_some();
        self.advance(state);

        self.storage.remove()?;

        if had_identity {
            info!("Signed out");
        }
        Ok(())
    }

    fn advance(&self, state: &mut StoreState) {
        state.epoch = state.epoch.next();
        self.epochs.send_replace(state.epoch);
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
