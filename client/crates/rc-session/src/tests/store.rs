use crate::tests::{EMAIL, TOKEN, hydrated_store, resolved, unresolved, unresolved_record};
use crate::{Identity, MemoryStorage, SessionError, SessionStore};

use std::sync::Arc;

use googletest::assert_that;
use googletest::prelude::{anything, none, some};
use serde_json::json;

// =============================================================================
// hydrate
// =============================================================================

#[test]
fn given_no_record_when_hydrate_then_none() {
    let store = SessionStore::new(Arc::new(MemoryStorage::new()));

    assert_that!(store.hydrate(), none());
    assert_that!(store.current(), none());
}

#[test]
fn given_valid_record_when_hydrate_then_current_matches() {
    let (_storage, store) = hydrated_store(unresolved_record());

    let current = store.current().unwrap();

    assert_eq!(current.email, EMAIL);
    assert_eq!(current.token, TOKEN);
    assert_eq!(current.username, EMAIL);
}

#[test]
fn given_records_missing_credentials_when_hydrate_then_none() {
    let records = [
        json!({ "email": EMAIL, "token": "" }).to_string(),
        json!({ "email": "", "token": TOKEN }).to_string(),
        json!({ "email": EMAIL }).to_string(),
        json!({ "token": TOKEN, "username": "legacy" }).to_string(),
    ];

    for record in records {
        let (_storage, store) = hydrated_store(record.clone());
        assert!(store.current().is_none(), "{record} should not hydrate");
    }
}

#[test]
fn given_corrupt_record_when_hydrate_then_none_and_record_untouched() {
    let corrupt = "{\"email\": \"chef@recette.test\", \"tok";
    let (storage, store) = hydrated_store(corrupt.to_string());

    assert_that!(store.current(), none());
    assert_eq!(storage.record().as_deref(), Some(corrupt));
}

#[test]
fn given_record_with_garbage_id_when_hydrate_then_id_absent() {
    let record = json!({ "id": "twelve", "email": EMAIL, "token": TOKEN }).to_string();
    let (_storage, store) = hydrated_store(record);

    assert_that!(store.current().unwrap().id, none());
}

// =============================================================================
// login
// =============================================================================

#[test]
fn given_identity_when_login_then_current_equals_normalized_form() {
    let store = SessionStore::new(Arc::new(MemoryStorage::new()));
    let input = Identity {
        profile_picture: Some(String::new()),
        ..unresolved()
    };

    let committed = store.login(input.clone()).unwrap();

    assert_eq!(store.current(), Some(committed.clone()));
    assert_eq!(input.normalize(), Some(committed));
}

#[test]
fn given_login_when_record_rehydrated_then_same_identity() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());

    let committed = store.login(resolved(4, "chef")).unwrap();
    let reloaded = SessionStore::open(storage.clone());

    assert_eq!(reloaded.current(), Some(committed));
}

#[test]
fn given_invalid_identity_when_login_then_err_and_state_unchanged() {
    let (storage, store) = hydrated_store(unresolved_record());
    let before = store.current();
    let epoch = store.epoch();

    let result = store.login(Identity {
        email: String::new(),
        ..resolved(1, "chef")
    });

    assert!(matches!(result, Err(SessionError::InvalidIdentity { .. })));
    assert_eq!(store.current(), before);
    assert_eq!(store.epoch(), epoch);
    assert_eq!(storage.record(), Some(unresolved_record()));
}

#[test]
fn given_existing_session_when_login_then_fully_replaced() {
    let (_storage, store) = hydrated_store(unresolved_record());

    let replacement = Identity {
        email: "julia@recette.test".to_string(),
        token: "other-token".to_string(),
        ..resolved(2, "julia")
    };
    store.login(replacement.clone()).unwrap();

    assert_eq!(store.current(), Some(replacement));
    assert_eq!(store.token().as_deref(), Some("other-token"));
}

// =============================================================================
// logout
// =============================================================================

#[test]
fn given_session_when_logout_then_memory_and_record_cleared() {
    let (storage, store) = hydrated_store(unresolved_record());

    store.logout().unwrap();

    assert_that!(store.current(), none());
    assert_that!(storage.record(), none());
    assert_that!(store.token(), none());
}

#[test]
fn given_logout_when_rehydrated_then_none() {
    let (storage, store) = hydrated_store(unresolved_record());
    store.logout().unwrap();

    let reloaded = SessionStore::open(storage.clone());

    assert_that!(reloaded.current(), none());
}

#[test]
fn given_no_session_when_logout_then_ok() {
    let store = SessionStore::new(Arc::new(MemoryStorage::new()));

    assert!(store.logout().is_ok());
}

// =============================================================================
// epochs
// =============================================================================

#[test]
fn given_mutations_when_epoch_read_then_strictly_increasing() {
    let store = SessionStore::new(Arc::new(MemoryStorage::new()));
    let start = store.epoch();

    store.hydrate();
    let after_hydrate = store.epoch();
    store.login(unresolved()).unwrap();
    let after_login = store.epoch();
    store.logout().unwrap();
    let after_logout = store.epoch();

    assert!(start < after_hydrate);
    assert!(after_hydrate < after_login);
    assert!(after_login < after_logout);
}

#[test]
fn given_current_epoch_when_login_if_current_then_committed() {
    let (_storage, store) = hydrated_store(unresolved_record());
    let epoch = store.epoch();

    let committed = store.login_if_current(epoch, resolved(42, "chef42")).unwrap();

    assert_that!(committed, some(anything()));
    assert_eq!(store.current(), Some(resolved(42, "chef42")));
}

#[test]
fn given_stale_epoch_when_login_if_current_then_discarded() {
    let (storage, store) = hydrated_store(unresolved_record());
    let stale = store.epoch();
    store.logout().unwrap();

    let committed = store.login_if_current(stale, resolved(42, "chef42")).unwrap();

    assert_that!(committed, none());
    assert_that!(store.current(), none());
    assert_that!(storage.record(), none());
}

#[test]
fn given_stale_epoch_when_logout_if_current_then_session_kept() {
    let (_storage, store) = hydrated_store(unresolved_record());
    let stale = store.epoch();
    store.login(resolved(5, "julia")).unwrap();

    let cleared = store.logout_if_current(stale).unwrap();

    assert!(!cleared);
    assert_eq!(store.current(), Some(resolved(5, "julia")));
}

#[test]
fn given_subscriber_when_login_then_notified_with_new_epoch() {
    let store = SessionStore::new(Arc::new(MemoryStorage::new()));
    let mut changes = store.subscribe();

    store.login(unresolved()).unwrap();

    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), store.epoch());
}
