//! In-flight 请求表
//!
//! 以缓存 key 为粒度的异步互斥。同 key 的并发请求排队，
//! 第一个完成合成并写入缓存后，后续请求重新检查缓存即可命中。

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::synthesis::CacheKey;

#[derive(Default)]
pub struct InFlightTable {
    slots: DashMap<CacheKey, Arc<Mutex<()>>>,
}

/// 持有期间独占该 key
///
/// 字段按声明顺序释放：先解锁，再尝试回收表项
pub struct InFlightGuard<'a> {
    _lock: OwnedMutexGuard<()>,
    _release: SlotRelease<'a>,
}

struct SlotRelease<'a> {
    table: &'a InFlightTable,
    key: CacheKey,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        // 只剩表自身引用时回收
        self.table
            .slots
            .remove_if(&self.key, |_, slot| Arc::strong_count(slot) == 1);
    }
}

impl InFlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 等待并独占 key
    pub async fn acquire(&self, key: &CacheKey) -> InFlightGuard<'_> {
        let release = SlotRelease {
            table: self,
            key: key.clone(),
        };
        let slot = self.slots.entry(key.clone()).or_default().clone();
        let lock = slot.lock_owned().await;

        InFlightGuard {
            _lock: lock,
            _release: release,
        }
    }

    /// 当前被持有或等待中的 key 数量
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn key(text: &str) -> CacheKey {
        CacheKey::compute("xtts-v2", "en", None, text, "wav")
    }

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let table = Arc::new(InFlightTable::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let table = table.clone();
            let active = active.clone();
            let max_active = max_active.clone();
            handles.push(tokio::spawn(async move {
                let _guard = table.acquire(&key("same")).await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let table = InFlightTable::new();
        let _a = table.acquire(&key("a")).await;
        let b = tokio::time::timeout(Duration::from_millis(100), table.acquire(&key("b"))).await;
        assert!(b.is_ok());
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let table = InFlightTable::new();
        {
            let _guard = table.acquire(&key("x")).await;
            assert_eq!(table.len(), 1);
        }
        assert!(table.is_empty());
    }
}
