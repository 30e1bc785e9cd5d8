use super::*;

fn token(expires_at: i64) -> StoredToken {
    StoredToken { access_token: "abc".to_owned(), expires_at }
}

// =============================================================
// StoredToken
// =============================================================

#[test]
fn from_response_anchors_expiry_at_now() {
    let resp = AuthTokenResponse {
        access_token: "jwt".to_owned(),
        token_type: "bearer".to_owned(),
        expires_in: 900,
        user: None,
    };
    let stored = StoredToken::from_response(&resp, 1_000);
    assert_eq!(stored.access_token, "jwt");
    assert_eq!(stored.expires_at, 1_900);
}

#[test]
fn expires_within_uses_margin() {
    let t = token(1_000);
    assert!(!t.expires_within(960, 30));
    assert!(t.expires_within(970, 30));
    assert!(t.expires_within(1_200, 30));
}

#[test]
fn is_expired_at_boundary() {
    let t = token(1_000);
    assert!(!t.is_expired(999));
    assert!(t.is_expired(1_000));
}

// =============================================================
// MemoryTokenStore
// =============================================================

#[test]
fn memory_store_save_load_clear() {
    let store = MemoryTokenStore::default();
    assert!(store.load().is_none());
    store.save(&token(5));
    assert_eq!(store.load(), Some(token(5)));
    store.clear();
    assert!(store.load().is_none());
}

// =============================================================
// FileTokenStore
// =============================================================

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("token.json");

    FileTokenStore::new(&path).save(&token(42));
    assert!(path.exists());
    assert_eq!(FileTokenStore::new(&path).load(), Some(token(42)));
}

#[test]
fn file_store_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("absent.json"));
    assert!(store.load().is_none());
    store.clear();
}

#[test]
fn file_store_corrupt_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(FileTokenStore::new(&path).load().is_none());
}

#[test]
fn file_store_clear_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    let store = FileTokenStore::new(&path);
    store.save(&token(1));
    store.clear();
    assert!(!path.exists());
    assert!(store.load().is_none());
}
