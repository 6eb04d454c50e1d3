mod store;

use crate::{Identity, IdentityLookup, MemoryStorage, SessionError, SessionResult, SessionStore};

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::oneshot;

pub(crate) const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.chef";
pub(crate) const EMAIL: &str = "chef@recette.test";

/// Identity as it looks right after a token restore: no id, no username.
pub(crate) fn unresolved() -> Identity {
    Identity {
        id: None,
        email: EMAIL.to_string(),
        username: String::new(),
        token: TOKEN.to_string(),
        profile_picture: None,
    }
}

pub(crate) fn resolved(id: u64, username: &str) -> Identity {
    Identity {
        id: NonZeroU64::new(id),
        username: username.to_string(),
        ..unresolved()
    }
}

pub(crate) fn unresolved_record() -> String {
    json!({ "email": EMAIL, "username": "", "token": TOKEN }).to_string()
}

/// Store over an in-memory record, already hydrated.
pub(crate) fn hydrated_store(record: String) -> (Arc<MemoryStorage>, Arc<SessionStore>) {
    let storage = Arc::new(MemoryStorage::with_record(record));
    let store = Arc::new(SessionStore::open(storage.clone()));
    (storage, store)
}

pub(crate) enum Reply {
    Profile(Value),
    Unauthorized,
    Unreachable,
}

/// Answers every lookup with the same reply and counts calls.
pub(crate) struct ScriptedLookup {
    reply: Reply,
    calls: AtomicUsize,
    tokens: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub(crate) fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityLookup for ScriptedLookup {
    async fn lookup_identity(&self, token: &str) -> SessionResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());

        match &self.reply {
            Reply::Profile(body) => Ok(body.clone()),
            Reply::Unauthorized => Err(SessionError::unauthorized("401 Could not validate credentials")),
            Reply::Unreachable => Err(SessionError::lookup("connection refused")),
        }
    }
}

/// Holds the lookup open until the test sends a reply.
pub(crate) struct PendingLookup {
    started: Mutex<Option<oneshot::Sender<()>>>,
    reply: Mutex<Option<oneshot::Receiver<SessionResult<Value>>>>,
}

impl PendingLookup {
    pub(crate) fn new() -> (
        Arc<Self>,
        oneshot::Receiver<()>,
        oneshot::Sender<SessionResult<Value>>,
    ) {
        let (started_tx, started_rx) = oneshot::channel();
        let (reply_tx, reply_rx) = oneshot::channel();
        let lookup = Arc::new(Self {
            started: Mutex::new(Some(started_tx)),
            reply: Mutex::new(Some(reply_rx)),
        });
        (lookup, started_rx, reply_tx)
    }
}

#[async_trait]
impl IdentityLookup for PendingLookup {
    async fn lookup_identity(&self, _token: &str) -> SessionResult<Value> {
        let started = self.started.lock().unwrap().take();
        if let Some(started) = started {
            let _ = started.send(());
        }

        let reply = self.reply.lock().unwrap().take();
        match reply {
            Some(reply) => reply
                .await
                .unwrap_or_else(|_| Err(SessionError::lookup("reply dropped"))),
            None => Err(SessionError::lookup("lookup already used")),
        }
    }
}
