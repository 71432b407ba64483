use super::*;
use storage::MemoryTokenStorage;

fn memory_store() -> (Arc<MemoryTokenStorage>, SessionStore) {
    let storage = Arc::new(MemoryTokenStorage::new());
    let store = SessionStore::new(storage.clone(), "http://localhost:3001");
    (storage, store)
}

#[tokio::test]
async fn set_then_get_returns_same_token() {
    let (_, store) = memory_store();
    store.set(&Token::new("T1")).await;
    assert_eq!(store.get().await, Some(Token::new("T1")));
}

#[tokio::test]
async fn set_overwrites_previous_token() {
    let (storage, store) = memory_store();
    store.set(&Token::new("T1")).await;
    store.set(&Token::new("T2")).await;
    assert_eq!(store.get().await, Some(Token::new("T2")));
    assert_eq!(storage.len(), 1);
}

#[tokio::test]
async fn clear_removes_token_and_is_idempotent() {
    let (_, store) = memory_store();
    store.set(&Token::new("T1")).await;
    store.clear().await;
    store.clear().await;
    assert_eq!(store.get().await, None);
}

#[tokio::test]
async fn unavailable_storage_never_reaches_the_caller() {
    let (storage, store) = memory_store();
    storage.set_unavailable(true);

    store.set(&Token::new("T1")).await;
    store.clear().await;
    assert_eq!(store.get().await, None);

    storage.set_unavailable(false);
    assert_eq!(store.get().await, None);
}

#[tokio::test]
async fn stores_for_different_origins_do_not_share_tokens() {
    let storage: Arc<MemoryTokenStorage> = Arc::new(MemoryTokenStorage::new());
    let local = SessionStore::for_base_url(storage.clone(), "http://localhost:3001/api")
        .expect("local origin");
    let remote = SessionStore::for_base_url(storage.clone(), "https://auth.example.com/v1")
        .expect("remote origin");

    local.set(&Token::new("local-token")).await;
    assert_eq!(remote.get().await, None);
    assert_eq!(local.get().await, Some(Token::new("local-token")));
}

#[test]
fn origin_key_keeps_scheme_host_and_port_only() {
    assert_eq!(
        origin_key("http://localhost:3001/api").expect("origin"),
        "http://localhost:3001"
    );
    assert_eq!(
        origin_key("https://auth.example.com/v1/").expect("origin"),
        "https://auth.example.com"
    );
    assert!(origin_key("not a url").is_err());
}
