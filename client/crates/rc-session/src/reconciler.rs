use crate::{Epoch, Identity, IdentityLookup, SessionState, SessionStore, Snapshot};

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;

/// What a reconciliation attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No identity to reconcile.
    NoSession,
    /// The identity was already complete; no lookup was made.
    AlreadyComplete,
    /// The lookup succeeded and the enriched identity was committed.
    Resolved { identity: Identity, epoch: Epoch },
    /// The lookup failed and the session was cleared.
    LoggedOut,
    /// The identity changed while the lookup was pending; the result was dropped.
    Superseded,
}

/// Fills in missing identity fields from the server, or ends the session.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<SessionStore>,
    lookup: Arc<dyn IdentityLookup>,
}

impl Reconciler {
    pub fn new(store: Arc<SessionStore>, lookup: Arc<dyn IdentityLookup>) -> Self {
        Self { store, lookup }
    }

    /// Reconcile the store's current identity once.
    pub async fn reconcile(&self) -> ReconcileOutcome {
        self.reconcile_snapshot(self.store.snapshot()).await
    }

    /// Reconcile `snapshot`, applying the result only if its epoch is still current.
    pub async fn reconcile_snapshot(&self, snapshot: Snapshot) -> ReconcileOutcome {
        let identity = match (snapshot.state(), snapshot.identity) {
            (SessionState::LoggedOut, _) | (_, None) => return ReconcileOutcome::NoSession,
            (SessionState::Complete, _) => return ReconcileOutcome::AlreadyComplete,
            (SessionState::Incomplete, Some(identity)) => identity,
        };

        debug!(
            "Resolving incomplete identity for {} (epoch {})",
            identity.email,
            snapshot.epoch.value()
        );

        match self.lookup.lookup_identity(&identity.token).await {
            Ok(body) => match identity.merge_lookup(&body) {
                Some(enriched) => self.commit(snapshot.epoch, enriched),
                None => {
                    warn!("Identity lookup returned an unusable profile");
                    self.clear(snapshot.epoch)
                }
            },
            Err(e) => {
                warn!("Identity lookup failed, signing out: {e}");
                self.clear(snapshot.epoch)
            }
        }
    }

    /// Run in the background, reconciling each new incomplete identity.
    ///
    /// A pending lookup is abandoned as soon as the store changes. Identities
    /// this task committed itself are not looked up again, even if the server
    /// left them incomplete. Abort the handle to stop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let mut changes = self.store.subscribe();
        let mut settled: Option<Epoch> = None;

        loop {
            changes.mark_unchanged();
            let snapshot = self.store.snapshot();

            if settled != Some(snapshot.epoch) && snapshot.state() == SessionState::Incomplete {
                tokio::select! {
                    biased;

                    outcome = self.reconcile_snapshot(snapshot) => {
                        if let ReconcileOutcome::Resolved { epoch, .. } = outcome {
                            settled = Some(epoch);
                        }
                        continue;
                    }
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        debug!("Session changed during lookup; abandoning it");
                        continue;
                    }
                }
            }

            if changes.changed().await.is_err() {
                break;
            }
        }
    }

    fn commit(&self, epoch: Epoch, enriched: Identity) -> ReconcileOutcome {
        match self.store.login_if_current(epoch, enriched) {
            Ok(Some(Snapshot {
                identity: Some(identity),
                epoch,
            })) => {
                info!("Session resolved for {}", identity.username);
                ReconcileOutcome::Resolved { identity, epoch }
            }
            Ok(_) => ReconcileOutcome::Superseded,
            Err(e) => {
                warn!("Could not persist resolved identity, signing out: {e}");
                self.clear(epoch)
            }
        }
    }

    fn clear(&self, epoch: Epoch) -> ReconcileOutcome {
        match self.store.logout_if_current(epoch) {
            Ok(true) => ReconcileOutcome::LoggedOut,
            Ok(false) => ReconcileOutcome::Superseded,
            Err(e) => {
                // Memory is already cleared at this point.
                warn!("Signed out but could not remove session record: {e}");
                ReconcileOutcome::LoggedOut
            }
        }
    }
}
