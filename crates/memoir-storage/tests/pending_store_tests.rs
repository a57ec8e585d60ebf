use memoir_storage::PendingStore;

#[tokio::test]
async fn test_entries_survive_reopen() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("pending.db");

    let store = PendingStore::new(Some(db_path.clone())).await.unwrap();
    store
        .enqueue_upload("images/u1/a.png", "file:/tmp/a.png", Some("session-1"))
        .await
        .unwrap();
    store.enqueue_delete("images/u1/b.png").await.unwrap();
    drop(store);

    let reopened = PendingStore::new(Some(db_path)).await.unwrap();
    let uploads = reopened.list_uploads().await.unwrap();
    let deletes = reopened.list_deletes().await.unwrap();

    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].remote_path, "images/u1/a.png");
    assert_eq!(uploads[0].source_uri, "file:/tmp/a.png");
    assert_eq!(uploads[0].session_token.as_deref(), Some("session-1"));
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].remote_path, "images/u1/b.png");
}

#[tokio::test]
async fn test_remove_deletes_only_the_given_row() {
    let temp = tempfile::tempdir().unwrap();
    let store = PendingStore::new(Some(temp.path().join("pending.db")))
        .await
        .unwrap();

    let first = store.enqueue_delete("images/u1/a.png").await.unwrap();
    let second = store.enqueue_delete("images/u1/b.png").await.unwrap();

    store.remove_delete(first.id).await.unwrap();

    let deletes = store.list_deletes().await.unwrap();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].id, second.id);
}

#[tokio::test]
async fn test_duplicate_paths_are_legal() {
    let temp = tempfile::tempdir().unwrap();
    let store = PendingStore::new(Some(temp.path().join("pending.db")))
        .await
        .unwrap();

    let first = store
        .enqueue_upload("images/u1/a.png", "file:/tmp/a.png", None)
        .await
        .unwrap();
    let second = store
        .enqueue_upload("images/u1/a.png", "file:/tmp/a.png", None)
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(store.list_uploads().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_session_token_replacement() {
    let temp = tempfile::tempdir().unwrap();
    let store = PendingStore::new(Some(temp.path().join("pending.db")))
        .await
        .unwrap();

    let upload = store
        .enqueue_upload("images/u1/a.png", "file:/tmp/a.png", None)
        .await
        .unwrap();
    store
        .update_upload_session(upload.id, "session-2")
        .await
        .unwrap();

    let uploads = store.list_uploads().await.unwrap();
    assert_eq!(uploads[0].session_token.as_deref(), Some("session-2"));
}

#[tokio::test]
async fn test_lists_are_ordered_by_id() {
    let temp = tempfile::tempdir().unwrap();
    let store = PendingStore::new(Some(temp.path().join("pending.db")))
        .await
        .unwrap();

    for name in ["a", "b", "c"] {
        store
            .enqueue_upload(
                &format!("images/u1/{name}.png"),
                &format!("file:/tmp/{name}.png"),
                None,
            )
            .await
            .unwrap();
    }

    let uploads = store.list_uploads().await.unwrap();
    let ids: Vec<i64> = uploads.iter().map(|u| u.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}
