mod common;

use std::{path::PathBuf, sync::Arc};

use common::{SPACE, credential};
use sharelist::{
    error::Error,
    management::{
        Auth, Condition, CredentialRecord, CredentialStore, FileTable, MemoryTable, NEVER_EXPIRES,
        Provider, Table,
    },
    types::{HistoryEntry, LinkKind, TrackItem},
    utils,
};

fn memory_store() -> CredentialStore {
    CredentialStore::new(Arc::new(MemoryTable::new()))
}

fn temp_table_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("sharelist-test-{}", utils::generate_nonce()))
        .join("table.json")
}

fn history_entry(space: &str, track: &str, added: i64) -> HistoryEntry {
    let item = TrackItem {
        id: track.to_string(),
        name: format!("Song {track}"),
        artists: vec!["Artist".to_string()],
        kind: LinkKind::Track,
        user: "U1".to_string(),
    };
    HistoryEntry::new(space, "pl-tracks", &item, added)
}

#[tokio::test]
async fn test_get_unknown_space_is_not_found() {
    let store = memory_store();
    let result = store.get(SPACE, Provider::Spotify).await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_begin_handshake_resets_record() {
    let store = memory_store();
    store
        .save(SPACE, Provider::Spotify, credential("old", NEVER_EXPIRES))
        .await
        .unwrap();

    let verify = store.begin_handshake(SPACE, Provider::Spotify).await.unwrap();
    let record = store.get(SPACE, Provider::Spotify).await.unwrap();

    assert_eq!(record.verify.as_deref(), Some(verify.as_str()));
    assert_eq!(record.auth, None);
    assert_eq!(record.expires, None);
    assert_eq!(record.id, "auth|spotify");
}

#[tokio::test]
async fn test_complete_handshake_consumes_nonce() {
    let store = memory_store();
    let verify = store.begin_handshake(SPACE, Provider::Spotify).await.unwrap();

    let stored = store
        .complete_handshake(SPACE, Provider::Spotify, &verify, credential("a", 100))
        .await
        .unwrap();
    assert!(stored);

    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(record.verify, None);
    assert_eq!(record.expires, Some(100));
    assert_eq!(record.credential().unwrap().auth.access(), "a");

    // a replayed callback finds no nonce anymore
    let replayed = store
        .complete_handshake(SPACE, Provider::Spotify, &verify, credential("b", 200))
        .await
        .unwrap();
    assert!(!replayed);
    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(record.credential().unwrap().auth.access(), "a");
}

#[tokio::test]
async fn test_complete_handshake_with_wrong_nonce_changes_nothing() {
    let store = memory_store();
    let verify = store.begin_handshake(SPACE, Provider::Spotify).await.unwrap();

    let stored = store
        .complete_handshake(SPACE, Provider::Spotify, "forged", credential("x", 100))
        .await
        .unwrap();
    assert!(!stored);

    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(record.verify.as_deref(), Some(verify.as_str()));
    assert_eq!(record.auth, None);
    assert_eq!(record.expires, None);
}

#[tokio::test]
async fn test_complete_handshake_without_record() {
    let store = memory_store();
    let stored = store
        .complete_handshake(SPACE, Provider::Spotify, "anything", credential("x", 100))
        .await
        .unwrap();
    assert!(!stored);
    assert!(store.get(SPACE, Provider::Spotify).await.is_err());
}

#[tokio::test]
async fn test_refresh_update_requires_expected_expiry() {
    let store = memory_store();
    store
        .save(SPACE, Provider::Spotify, credential("a", 100))
        .await
        .unwrap();

    assert!(
        !store
            .refresh_update(SPACE, Provider::Spotify, 99, credential("b", 200))
            .await
            .unwrap()
    );
    assert!(
        store
            .refresh_update(SPACE, Provider::Spotify, 100, credential("c", 300))
            .await
            .unwrap()
    );
    // the first writer moved expiry on, a second writer with the old view loses
    assert!(
        !store
            .refresh_update(SPACE, Provider::Spotify, 100, credential("d", 400))
            .await
            .unwrap()
    );

    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(record.expires, Some(300));
    assert_eq!(record.credential().unwrap().auth.access(), "c");
}

#[tokio::test]
async fn test_spaces_are_isolated() {
    let store = memory_store();
    store
        .save("T1", Provider::Spotify, credential("one", 100))
        .await
        .unwrap();
    assert!(store.get("T2", Provider::Spotify).await.is_err());
}

#[tokio::test]
async fn test_history_sorted_and_scoped() {
    let table = MemoryTable::new();
    table
        .append_history(vec![
            history_entry(SPACE, "b", 20),
            history_entry(SPACE, "a", 10),
            history_entry("other", "c", 5),
        ])
        .await
        .unwrap();

    let history = table.history(SPACE).await.unwrap();
    let tracks: Vec<&str> = history.iter().map(|e| e.track.as_str()).collect();
    assert_eq!(tracks, vec!["a", "b"]);
}

#[tokio::test]
async fn test_file_table_persists_across_instances() {
    let path = temp_table_path();
    let store = CredentialStore::new(Arc::new(FileTable::new(path.clone())));

    let verify = store.begin_handshake(SPACE, Provider::Spotify).await.unwrap();
    assert!(
        store
            .complete_handshake(SPACE, Provider::Spotify, &verify, credential("a", 100))
            .await
            .unwrap()
    );

    let reopened = FileTable::new(path.clone());
    let record: CredentialRecord = reopened
        .get(SPACE, &Provider::Spotify.record_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.verify, None);
    assert_eq!(
        record.auth,
        Some(Auth::Spotify {
            access: "a".to_string(),
            refresh: "refresh-a".to_string(),
        })
    );

    reopened
        .append_history(vec![history_entry(SPACE, "t1", 1)])
        .await
        .unwrap();
    let table = FileTable::new(path.clone());
    assert_eq!(table.history(SPACE).await.unwrap().len(), 1);
    // history lives next to the credential without replacing it
    assert!(table.get(SPACE, "auth|spotify").await.unwrap().is_some());

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test]
async fn test_file_table_missing_file_is_empty() {
    let table = FileTable::new(temp_table_path());
    assert!(table.get(SPACE, "auth|spotify").await.unwrap().is_none());
    assert!(table.history(SPACE).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_tables_sharing_a_path_have_single_update_winner() {
    let path = temp_table_path();
    // two instances stand in for a CLI process and a running server
    let first = Arc::new(FileTable::new(path.clone()));
    let second = Arc::new(FileTable::new(path.clone()));
    let id = Provider::Spotify.record_id();

    for round in 0..25 {
        first
            .put(CredentialRecord::authorized(SPACE, credential("seed", 0)))
            .await
            .unwrap();

        let race = |table: Arc<FileTable>, access: &'static str, expires: i64| {
            let id = id.clone();
            tokio::spawn(async move {
                table
                    .update(
                        SPACE,
                        &id,
                        Condition::ExpiresIs(0),
                        credential(access, expires),
                    )
                    .await
            })
        };
        let a = race(Arc::clone(&first), "a", 100);
        let b = race(Arc::clone(&second), "b", 200);
        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        assert!(a ^ b, "round {round}: a={a} b={b}");
        let record = second.get(SPACE, &id).await.unwrap().unwrap();
        let expected = if a { 100 } else { 200 };
        assert_eq!(record.expires, Some(expected), "round {round}");
    }

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_table_history_append_keeps_concurrent_credential_update() {
    let path = temp_table_path();
    let writer = Arc::new(FileTable::new(path.clone()));
    let appender = Arc::new(FileTable::new(path.clone()));
    writer
        .put(CredentialRecord::authorized(SPACE, credential("seed", 0)))
        .await
        .unwrap();

    let id = Provider::Spotify.record_id();
    let update = {
        let writer = Arc::clone(&writer);
        let id = id.clone();
        tokio::spawn(async move {
            writer
                .update(SPACE, &id, Condition::ExpiresIs(0), credential("rotated", 100))
                .await
        })
    };
    let append = {
        let appender = Arc::clone(&appender);
        tokio::spawn(async move {
            let entries = (0..10)
                .map(|i| history_entry(SPACE, &format!("t{i}"), i))
                .collect();
            appender.append_history(entries).await
        })
    };
    assert!(update.await.unwrap().unwrap());
    append.await.unwrap().unwrap();

    let table = FileTable::new(path.clone());
    let record = table.get(SPACE, &id).await.unwrap().unwrap();
    assert_eq!(record.expires, Some(100));
    assert_eq!(table.history(SPACE).await.unwrap().len(), 10);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
