use std::sync::Arc;

use storage::{MemoryTokenStorage, SqliteTokenStorage, TokenStorage};

async fn exercise(storage: Arc<dyn TokenStorage>) {
    assert_eq!(storage.load("origin-a").await.expect("load"), None);

    storage.store("origin-a", "A1").await.expect("store a");
    storage.store("origin-b", "B1").await.expect("store b");
    storage.remove("origin-a").await.expect("remove a");

    assert_eq!(storage.load("origin-a").await.expect("load a"), None);
    assert_eq!(
        storage.load("origin-b").await.expect("load b").as_deref(),
        Some("B1")
    );
}

#[tokio::test]
async fn sqlite_and_memory_backends_share_semantics() {
    let sqlite = SqliteTokenStorage::new("sqlite::memory:").await.expect("db");
    exercise(Arc::new(sqlite)).await;
    exercise(Arc::new(MemoryTokenStorage::new())).await;
}
