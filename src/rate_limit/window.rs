//! Fixed time-bucket counters shared by the window limiters.

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Bucket {
    token: String,
    window: u64,
    count: u32,
}

/// Counters keyed by `token:{floor(now / interval)}`.
#[derive(Debug)]
pub(crate) struct WindowCounter {
    interval_ms: u64,
    max_tokens: usize,
    buckets: DashMap<String, Bucket>,
}

impl WindowCounter {
    pub(crate) fn new(interval_ms: u64, max_tokens: usize) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            max_tokens: max_tokens.max(1),
            buckets: DashMap::new(),
        }
    }

    pub(crate) fn window_index(&self, now_ms: u64) -> u64 {
        now_ms / self.interval_ms
    }

    pub(crate) fn reset_at(&self, now_ms: u64) -> u64 {
        (self.window_index(now_ms) + 1) * self.interval_ms
    }

    fn key(&self, token: &str, now_ms: u64) -> String {
        format!("{}:{}", token, self.window_index(now_ms))
    }

    pub(crate) fn used(&self, token: &str, now_ms: u64) -> u32 {
        self.buckets
            .get(&self.key(token, now_ms))
            .map_or(0, |bucket| bucket.count)
    }

    /// Add `amount` to the current bucket and return the new count.
    pub(crate) fn add(&self, token: &str, amount: u32, now_ms: u64) -> u32 {
        self.charge(token, amount, now_ms).0
    }

    /// Like `add`, also naming the token whose live bucket was evicted to
    /// make room, if any.
    pub(crate) fn charge(&self, token: &str, amount: u32, now_ms: u64) -> (u32, Option<String>) {
        let key = self.key(token, now_ms);
        let mut evicted = None;
        if !self.buckets.contains_key(&key) && self.buckets.len() >= self.max_tokens {
            evicted = self.make_room(now_ms);
        }

        let window = self.window_index(now_ms);
        let mut bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            token: token.to_string(),
            window,
            count: 0,
        });
        bucket.count = bucket.count.saturating_add(amount);
        (bucket.count, evicted)
    }

    /// Drop every bucket held by `token`.
    pub(crate) fn forget_token(&self, token: &str) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| bucket.token != token);
        before.saturating_sub(self.buckets.len())
    }

    /// Drop buckets from windows that have ended.
    pub(crate) fn sweep(&self, now_ms: u64) -> usize {
        let current = self.window_index(now_ms);
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| bucket.window >= current);
        before.saturating_sub(self.buckets.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    fn make_room(&self, now_ms: u64) -> Option<String> {
        if self.sweep(now_ms) > 0 {
            return None;
        }
        let oldest = self
            .buckets
            .iter()
            .min_by_key(|entry| (entry.value().window, entry.value().count))
            .map(|entry| entry.key().clone())?;
        self.buckets.remove(&oldest).map(|(_, bucket)| bucket.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_roll_over() {
        let counter = WindowCounter::new(1000, 100);
        assert_eq!(counter.add("t", 1, 500), 1);
        assert_eq!(counter.add("t", 1, 999), 2);
        assert_eq!(counter.used("t", 1000), 0);
        assert_eq!(counter.reset_at(500), 1000);
        assert_eq!(counter.sweep(1000), 1);
    }

    #[test]
    fn test_max_tokens_evicts() {
        let counter = WindowCounter::new(1000, 2);
        counter.add("a", 1, 0);
        counter.add("b", 1, 0);
        counter.add("c", 1, 0);
        assert_eq!(counter.len(), 2);
        assert_eq!(counter.used("c", 0), 1);
    }

    #[test]
    fn test_charge_names_evicted_token() {
        let counter = WindowCounter::new(1000, 1);
        assert_eq!(counter.charge("a", 1, 0), (1, None));
        assert_eq!(counter.charge("b", 1, 0), (1, Some("a".to_string())));

        // A finished window is swept instead of evicting a live token.
        assert_eq!(counter.charge("c", 1, 1000), (1, None));
        assert_eq!(counter.forget_token("c"), 1);
    }
}
