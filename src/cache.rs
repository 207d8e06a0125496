use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Key-value session cache: one active token per user id
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn put(&self, uid: i64, token: &str, ttl: Duration);
    async fn get(&self, uid: i64) -> Option<String>;
    async fn remove(&self, uid: i64);
}

fn token_key(uid: i64) -> String {
    format!("token:{}", uid)
}

/// In-process TTL map. Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, uid: i64, token: &str, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(token_key(uid), (token.to_string(), expires_at));
    }

    async fn get(&self, uid: i64) -> Option<String> {
        let key = token_key(uid);
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some((token, expires_at)) if *expires_at > Instant::now() => {
                    return Some(token.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().await.remove(&key);
        None
    }

    async fn remove(&self, uid: i64) {
        self.entries.write().await.remove(&token_key(uid));
    }
}
