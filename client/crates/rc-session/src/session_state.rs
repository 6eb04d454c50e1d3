use crate::Identity;

/// Where an identity stands with respect to reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No identity; nothing to reconcile until the next login.
    LoggedOut,
    /// Token-bearing but missing `id` or `username`.
    Incomplete,
    /// Fully resolved.
    Complete,
}

impl SessionState {
    pub fn of(identity: Option<&Identity>) -> Self {
        match identity {
            None => Self::LoggedOut,
            Some(identity) if identity.is_complete() => Self::Complete,
            Some(_) => Self::Incomplete,
        }
    }
}
