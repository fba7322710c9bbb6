use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Process-scoped read cache with a fixed TTL and explicit invalidation.
/// Writers call `invalidate` after every mutation; readers repopulate with
/// `put` after a miss.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Arc<Mutex<Option<Entry<T>>>>,
}

#[derive(Debug)]
struct Entry<T> {
    stored_at: Instant,
    value: T,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn get(&self) -> Option<T> {
        let guard = self.slot.lock().expect("cache lock poisoned");
        match guard.as_ref() {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub fn put(&self, value: T) {
        let mut guard = self.slot.lock().expect("cache lock poisoned");
        *guard = Some(Entry {
            stored_at: Instant::now(),
            value,
        });
    }

    pub fn invalidate(&self) {
        let mut guard = self.slot.lock().expect("cache lock poisoned");
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_value_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(), None::<Vec<i64>>);
        cache.put(vec![1, 2, 3]);
        assert_eq!(cache.get(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(0));
        cache.put(42);
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn invalidate_clears_slot() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("menu".to_string());
        cache.invalidate();
        assert_eq!(cache.get(), None);
    }
}
