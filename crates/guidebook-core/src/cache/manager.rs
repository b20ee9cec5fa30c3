use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::ExpirationPolicy;
use crate::offline::{Response, ResponseSource};

/// Index file name inside each bucket directory
const INDEX_FILE: &str = "index.json";

/// Extension for stored response bodies
const BODY_EXT: &str = "body";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self::at(data, Utc::now())
    }

    pub fn at(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                // Round up: 1d 12h+ becomes 2d
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// What the index remembers about one stored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub url: String,
    pub key: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub size: usize,
}

type BucketIndex = BTreeMap<String, CachedData<EntryMeta>>;

/// Summary of one bucket for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketStats {
    pub bucket: String,
    pub entries: usize,
    pub bytes: usize,
    pub newest: Option<DateTime<Utc>>,
}

impl BucketStats {
    pub fn newest_display(&self) -> String {
        self.newest
            .map(|at| CachedData::at((), at).age_display())
            .unwrap_or_else(|| "never".to_string())
    }
}

/// On-disk response cache, one directory per bucket.
///
/// Index read-modify-write cycles are serialized by an in-process lock;
/// the last write for a URL wins.
pub struct CacheManager {
    cache_dir: PathBuf,
    lock: Mutex<()>,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self {
            cache_dir,
            lock: Mutex::new(()),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Stable file-name key for a URL.
    pub fn entry_key(url: &str) -> String {
        format!("{:x}", Sha256::digest(url.as_bytes()))
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.cache_dir.join(bucket)
    }

    fn body_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.bucket_dir(bucket).join(format!("{}.{}", key, BODY_EXT))
    }

    fn load_index(&self, bucket: &str) -> Result<BucketIndex> {
        let path = self.bucket_dir(bucket).join(INDEX_FILE);
        if !path.exists() {
            return Ok(BucketIndex::new());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache index: {}", bucket))?;

        serde_json::from_str(&contents).with_context(|| format!("Failed to parse cache index: {}", bucket))
    }

    /// Index for a write. An unparsable index is dropped and rebuilt from
    /// scratch so one bad file cannot disable the bucket.
    fn load_index_for_write(&self, bucket: &str) -> Result<BucketIndex> {
        match self.load_index(bucket) {
            Err(e) if e.downcast_ref::<serde_json::Error>().is_some() => {
                warn!(bucket, error = %e, "Discarding unreadable cache index");
                Ok(BucketIndex::new())
            }
            other => other,
        }
    }

    fn save_index(&self, bucket: &str, index: &BucketIndex) -> Result<()> {
        let dir = self.bucket_dir(bucket);
        std::fs::create_dir_all(&dir)?;
        let contents = serde_json::to_string_pretty(index)?;
        // Write then rename so readers never see a half-written index
        let tmp = dir.join(format!("{}.tmp", INDEX_FILE));
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, dir.join(INDEX_FILE))?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| anyhow!("Cache lock poisoned"))
    }

    /// Look up a stored response. The returned response is marked as served
    /// from cache.
    pub fn get(&self, bucket: &str, url: &str) -> Result<Option<CachedData<Response>>> {
        let meta = {
            let _guard = self.guard()?;
            match self.load_index(bucket)?.remove(url) {
                Some(meta) => meta,
                None => return Ok(None),
            }
        };

        let path = self.body_path(bucket, &meta.data.key);
        let body = match std::fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(bucket, url, "Index entry without body, treating as miss");
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read cached body for {}", url)),
        };

        Ok(Some(CachedData::at(
            Response {
                url: meta.data.url,
                status: meta.data.status,
                content_type: meta.data.content_type,
                body,
                source: ResponseSource::Cache,
            },
            meta.cached_at,
        )))
    }

    pub fn put(&self, bucket: &str, response: &Response) -> Result<()> {
        self.put_at(bucket, response, Utc::now())
    }

    /// Store `response` under its URL with an explicit capture time.
    pub fn put_at(&self, bucket: &str, response: &Response, cached_at: DateTime<Utc>) -> Result<()> {
        let key = Self::entry_key(&response.url);
        let _guard = self.guard()?;
        let mut index = self.load_index_for_write(bucket)?;

        std::fs::create_dir_all(self.bucket_dir(bucket))?;
        std::fs::write(self.body_path(bucket, &key), &response.body)
            .with_context(|| format!("Failed to write cached body for {}", response.url))?;

        index.insert(
            response.url.clone(),
            CachedData::at(
                EntryMeta {
                    url: response.url.clone(),
                    key,
                    status: response.status,
                    content_type: response.content_type.clone(),
                    size: response.body.len(),
                },
                cached_at,
            ),
        );
        self.save_index(bucket, &index)
    }

    /// Apply `policy` to a bucket. Returns the number of evicted entries.
    pub fn prune(&self, bucket: &str, policy: &ExpirationPolicy, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.guard()?;
        let mut index = self.load_index_for_write(bucket)?;

        let ages: Vec<(String, DateTime<Utc>)> =
            index.iter().map(|(url, meta)| (url.clone(), meta.cached_at)).collect();
        let evict = policy.evictions(&ages, now);
        if evict.is_empty() {
            return Ok(0);
        }

        for url in &evict {
            if let Some(meta) = index.remove(url) {
                self.remove_body(bucket, &meta.data.key);
            }
        }
        self.save_index(bucket, &index)?;

        debug!(bucket, evicted = evict.len(), remaining = index.len(), "Pruned cache bucket");
        Ok(evict.len())
    }

    fn remove_body(&self, bucket: &str, key: &str) {
        let path = self.body_path(bucket, key);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(bucket, error = %e, "Failed to remove cached body");
            }
        }
    }

    /// Index entries of a bucket, newest first.
    pub fn entries(&self, bucket: &str) -> Result<Vec<CachedData<EntryMeta>>> {
        let _guard = self.guard()?;
        let mut entries: Vec<_> = self.load_index(bucket)?.into_values().collect();
        entries.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        Ok(entries)
    }

    pub fn stats(&self, bucket: &str) -> Result<BucketStats> {
        let entries = self.entries(bucket)?;
        Ok(BucketStats {
            bucket: bucket.to_string(),
            entries: entries.len(),
            bytes: entries.iter().map(|e| e.data.size).sum(),
            newest: entries.first().map(|e| e.cached_at),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn response(url: &str, body: &str) -> Response {
        Response {
            url: url.to_string(),
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.as_bytes().to_vec(),
            source: ResponseSource::Network,
        }
    }

    fn manager() -> (TempDir, CacheManager) {
        let dir = TempDir::new().unwrap();
        let manager = CacheManager::new(dir.path().join("cache")).unwrap();
        (dir, manager)
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::days(3) - Duration::hours(2);
        assert_eq!(cached.age_display(), "3d ago");
        cached.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_put_then_get() {
        let (_dir, cache) = manager();
        cache.put("guide-json", &response("http://x/guides/a/guide.json", "{}")).unwrap();

        let hit = cache.get("guide-json", "http://x/guides/a/guide.json").unwrap().unwrap();
        assert_eq!(hit.data.body, b"{}");
        assert_eq!(hit.data.source, ResponseSource::Cache);
        assert!(cache.get("guide-json", "http://x/other").unwrap().is_none());
        assert!(cache.get("local-images", "http://x/guides/a/guide.json").unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites_same_url() {
        let (_dir, cache) = manager();
        cache.put("b", &response("http://x/1", "old")).unwrap();
        cache.put("b", &response("http://x/1", "new")).unwrap();
        assert_eq!(cache.get("b", "http://x/1").unwrap().unwrap().data.body, b"new");
        assert_eq!(cache.entries("b").unwrap().len(), 1);
    }

    #[test]
    fn test_prune_removes_bodies() {
        let (_dir, cache) = manager();
        let now = Utc::now();
        cache.put_at("b", &response("http://x/old", "1"), now - Duration::days(40)).unwrap();
        cache.put_at("b", &response("http://x/new", "2"), now).unwrap();

        let evicted = cache.prune("b", &ExpirationPolicy::days(50, 30), now).unwrap();
        assert_eq!(evicted, 1);
        assert!(cache.get("b", "http://x/old").unwrap().is_none());
        assert!(!cache.body_path("b", &CacheManager::entry_key("http://x/old")).exists());
        assert!(cache.get("b", "http://x/new").unwrap().is_some());
    }

    #[test]
    fn test_prune_caps_entry_count() {
        let (_dir, cache) = manager();
        let now = Utc::now();
        for i in 0..5 {
            let url = format!("http://x/{}", i);
            cache.put_at("b", &response(&url, "x"), now - Duration::minutes(10 - i)).unwrap();
        }
        cache.prune("b", &ExpirationPolicy::days(3, 30), now).unwrap();

        let urls: Vec<String> = cache.entries("b").unwrap().into_iter().map(|e| e.data.url).collect();
        assert_eq!(urls, vec!["http://x/4", "http://x/3", "http://x/2"]);
    }

    #[test]
    fn test_stats() {
        let (_dir, cache) = manager();
        cache.put("b", &response("http://x/1", "abc")).unwrap();
        cache.put("b", &response("http://x/2", "de")).unwrap();

        let stats = cache.stats("b").unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.bytes, 5);
        assert_eq!(stats.newest_display(), "just now");

        assert_eq!(cache.stats("empty").unwrap().newest_display(), "never");
    }

    #[test]
    fn test_corrupt_index_fails_reads_until_next_write() {
        let (_dir, cache) = manager();
        std::fs::create_dir_all(cache.bucket_dir("b")).unwrap();
        std::fs::write(cache.bucket_dir("b").join(INDEX_FILE), "not json").unwrap();
        assert!(cache.get("b", "http://x/1").is_err());

        cache.put("b", &response("http://x/1", "abc")).unwrap();
        let hit = cache.get("b", "http://x/1").unwrap().unwrap();
        assert_eq!(hit.data.body, b"abc");
        assert_eq!(cache.stats("b").unwrap().entries, 1);
    }

    #[test]
    fn test_prune_recovers_from_corrupt_index() {
        let (_dir, cache) = manager();
        std::fs::create_dir_all(cache.bucket_dir("b")).unwrap();
        std::fs::write(cache.bucket_dir("b").join(INDEX_FILE), "{").unwrap();
        let policy = ExpirationPolicy::days(1, 1);
        assert_eq!(cache.prune("b", &policy, Utc::now()).unwrap(), 0);
    }
}
