//! In-Memory Pending Store Implementation
//!
//! 条目在 ttl 内无读写即失效：读取时惰性剔除，后台 sweeper 定期清理

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::application::ports::PendingStorePort;
use crate::domain::generation::EncodedImage;
use crate::domain::{ImageOutcome, PendingCommand};

struct Entry {
    command: PendingCommand,
    expires_at: Instant,
}

/// 内存待完成指令存储
pub struct InMemoryPendingStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl InMemoryPendingStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryPendingStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl PendingStorePort for InMemoryPendingStore {
    fn set(&self, session_id: &str, command: PendingCommand) {
        tracing::debug!(session_id = %session_id, kind = command.kind(), "Pending command stored");
        self.entries.insert(
            session_id.to_string(),
            Entry {
                command,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// 命中时顺延过期时间
    fn get(&self, session_id: &str) -> Option<PendingCommand> {
        let now = Instant::now();
        let command = {
            let mut entry = self.entries.get_mut(session_id)?;
            if entry.expires_at <= now {
                None
            } else {
                entry.expires_at = now + self.ttl;
                Some(entry.command.clone())
            }
        };

        if command.is_none() {
            self.entries
                .remove_if(session_id, |_, entry| entry.expires_at <= now);
            tracing::debug!(session_id = %session_id, "Pending command expired");
        }
        command
    }

    fn delete(&self, session_id: &str) -> Option<PendingCommand> {
        let now = Instant::now();
        self.entries
            .remove(session_id)
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(_, entry)| entry.command)
    }

    /// 命中时顺延过期时间
    fn contains(&self, session_id: &str) -> bool {
        let now = Instant::now();
        match self.entries.get_mut(session_id) {
            Some(mut entry) if entry.expires_at > now => {
                entry.expires_at = now + self.ttl;
                true
            }
            _ => false,
        }
    }

    fn accept_image(&self, session_id: &str, image: EncodedImage) -> Option<ImageOutcome> {
        let now = Instant::now();
        // entry 持有分片写锁，直到结果写回或移除
        let MapEntry::Occupied(mut occupied) = self.entries.entry(session_id.to_string()) else {
            return None;
        };

        if occupied.get().expires_at <= now {
            occupied.remove();
            tracing::debug!(session_id = %session_id, "Pending command expired");
            return None;
        }

        let outcome = occupied.get_mut().command.accept_image(image);
        if outcome.is_final() {
            occupied.remove();
        } else {
            occupied.get_mut().expires_at = now + self.ttl;
        }
        Some(outcome)
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlendProgress;

    const TTL: Duration = Duration::from_secs(3600);

    #[tokio::test(start_paused = true)]
    async fn test_set_get_delete() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::image_seed("a cat"));

        assert!(store.contains("s1"));
        assert_eq!(store.get("s1"), Some(PendingCommand::image_seed("a cat")));
        assert_eq!(store.delete("s1"), Some(PendingCommand::image_seed("a cat")));
        assert!(!store.contains("s1"));
        assert_eq!(store.delete("s1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::blend_seed("", 2));

        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert!(!store.contains("s1"));
        assert_eq!(store.get("s1"), None);
        // 读取时已剔除
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_refreshes_expiry() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::image_seed("a"));

        tokio::time::advance(Duration::from_secs(3000)).await;
        assert!(store.get("s1").is_some());

        tokio::time::advance(Duration::from_secs(3000)).await;
        assert!(store.contains("s1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_contains_refreshes_expiry() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::image_seed("a"));

        tokio::time::advance(Duration::from_secs(3000)).await;
        assert!(store.contains("s1"));

        tokio::time::advance(Duration::from_secs(3000)).await;
        assert!(store.contains("s1"));

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert!(!store.contains("s1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_image_accumulates_and_removes_when_complete() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::blend_seed("", 2));

        let first = store.accept_image("s1", EncodedImage::from_bytes(b"1"));
        assert_eq!(
            first,
            Some(ImageOutcome::Blend(BlendProgress::Waiting {
                received: 1,
                remaining: 1
            }))
        );
        assert!(store.contains("s1"));

        let second = store.accept_image("s1", EncodedImage::from_bytes(b"2"));
        assert_eq!(
            second,
            Some(ImageOutcome::Blend(BlendProgress::Complete(vec![
                EncodedImage::from_bytes(b"1"),
                EncodedImage::from_bytes(b"2"),
            ])))
        );
        assert!(store.is_empty());
        assert_eq!(store.accept_image("s1", EncodedImage::from_bytes(b"3")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_image_consumes_seed_once() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::image_seed("a cat"));

        let outcome = store.accept_image("s1", EncodedImage::from_bytes(b"1"));
        assert!(matches!(outcome, Some(ImageOutcome::SeedReady { .. })));
        assert_eq!(store.accept_image("s1", EncodedImage::from_bytes(b"2")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_image_ignores_expired_state() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::blend_seed("", 2));
        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert_eq!(store.accept_image("s1", EncodedImage::from_bytes(b"1")), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("old", PendingCommand::image_seed("a"));
        tokio::time::advance(Duration::from_secs(1800)).await;
        store.set("new", PendingCommand::image_seed("b"));
        tokio::time::advance(Duration::from_secs(1801)).await;

        assert_eq!(store.len(), 2);
        assert_eq!(store.purge_expired(), 1);
        assert!(store.contains("new"));
        assert!(!store.contains("old"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_are_independent() {
        let store = InMemoryPendingStore::new(TTL);
        store.set("s1", PendingCommand::image_seed("a"));
        store.set("s2", PendingCommand::blend_seed("", 3));

        store.delete("s1");
        assert!(store.contains("s2"));
        assert_eq!(store.len(), 1);
    }
}
