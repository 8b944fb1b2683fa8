use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Last question generated per (topic, difficulty), used as a hint against
/// immediate repetition. Bounded; concurrent writers race with last write
/// winning.
pub struct RecentQuestions {
    inner: Mutex<LruCache<(String, String), String>>,
}

impl RecentQuestions {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn key(topic: &str, difficulty: &str) -> (String, String) {
        (topic.to_lowercase(), difficulty.to_lowercase())
    }

    pub fn get(&self, topic: &str, difficulty: &str) -> Option<String> {
        let mut cache = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(&Self::key(topic, difficulty)).cloned()
    }

    pub fn put(&self, topic: &str, difficulty: &str, question: &str) {
        let mut cache = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(Self::key(topic, difficulty), question.to_string());
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
