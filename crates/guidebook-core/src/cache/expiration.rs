use chrono::{DateTime, Duration, Utc};

/// Retention bounds for one resource class.
///
/// Entries older than `max_age` are evicted; of the remainder, only the
/// `max_entries` most recently stored are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    pub max_entries: usize,
    pub max_age: Duration,
}

impl ExpirationPolicy {
    pub fn new(max_entries: usize, max_age: Duration) -> Self {
        Self {
            max_entries,
            max_age,
        }
    }

    pub fn days(max_entries: usize, days: i64) -> Self {
        Self::new(max_entries, Duration::days(days))
    }

    pub fn hours(max_entries: usize, hours: i64) -> Self {
        Self::new(max_entries, Duration::hours(hours))
    }

    pub fn is_fresh(&self, cached_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - cached_at <= self.max_age
    }

    /// Keys to evict from `entries` (key, capture time), oldest first.
    pub fn evictions<K: Clone>(&self, entries: &[(K, DateTime<Utc>)], now: DateTime<Utc>) -> Vec<K> {
        let mut by_age: Vec<&(K, DateTime<Utc>)> = entries.iter().collect();
        // Newest first; ties keep input order
        by_age.sort_by(|a, b| b.1.cmp(&a.1));

        let mut evict = Vec::new();
        let mut kept = 0usize;
        for (key, cached_at) in by_age {
            if !self.is_fresh(*cached_at, now) || kept >= self.max_entries {
                evict.push((key.clone(), *cached_at));
            } else {
                kept += 1;
            }
        }

        evict.sort_by(|a, b| a.1.cmp(&b.1));
        evict.into_iter().map(|(k, _)| k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(now: DateTime<Utc>, days_ago: i64) -> DateTime<Utc> {
        now - Duration::days(days_ago)
    }

    #[test]
    fn test_is_fresh() {
        let now = Utc::now();
        let policy = ExpirationPolicy::days(10, 30);
        assert!(policy.is_fresh(at(now, 29), now));
        assert!(!policy.is_fresh(at(now, 31), now));
    }

    #[test]
    fn test_evicts_expired_entries() {
        let now = Utc::now();
        let policy = ExpirationPolicy::days(10, 14);
        let entries = vec![("a", at(now, 1)), ("b", at(now, 20)), ("c", at(now, 13))];
        assert_eq!(policy.evictions(&entries, now), vec!["b"]);
    }

    #[test]
    fn test_evicts_least_recently_stored_over_capacity() {
        let now = Utc::now();
        let policy = ExpirationPolicy::days(2, 30);
        let entries = vec![("a", at(now, 3)), ("b", at(now, 1)), ("c", at(now, 5)), ("d", at(now, 2))];
        assert_eq!(policy.evictions(&entries, now), vec!["c", "a"]);
    }

    #[test]
    fn test_both_bounds_apply() {
        let now = Utc::now();
        let policy = ExpirationPolicy::days(1, 7);
        let entries = vec![("old", at(now, 8)), ("new", at(now, 1)), ("mid", at(now, 3))];
        assert_eq!(policy.evictions(&entries, now), vec!["old", "mid"]);
    }

    #[test]
    fn test_nothing_to_evict() {
        let now = Utc::now();
        let policy = ExpirationPolicy::days(50, 30);
        let entries = vec![("a", at(now, 0))];
        assert!(policy.evictions(&entries, now).is_empty());
    }
}
