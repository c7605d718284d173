use crate::domain::ports::PageCache;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 公開頁面的預設重新驗證時間 (24 小時)
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedPage {
    stored_at: Instant,
    body: String,
}

#[derive(Default)]
struct Pages {
    entries: HashMap<String, CachedPage>,
    generations: HashMap<String, u64>,
}

/// 行程內的頁面快取，過期或被失效後由下一次讀取重建
pub struct InMemoryPageCache {
    pages: Mutex<Pages>,
    ttl: Duration,
}

impl InMemoryPageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pages: Mutex::new(Pages::default()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.pages.lock().map(|pages| pages.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryPageCache {
    fn default() -> Self {
        Self::new(DEFAULT_REVALIDATE)
    }
}

impl PageCache for InMemoryPageCache {
    fn get(&self, path: &str) -> Option<String> {
        let mut pages = self.pages.lock().ok()?;
        let expired = match pages.entries.get(path) {
            Some(page) if page.stored_at.elapsed() < self.ttl => return Some(page.body.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            pages.entries.remove(path);
            tracing::debug!("Page cache expired: {}", path);
        }
        None
    }

    fn generation(&self, path: &str) -> u64 {
        self.pages
            .lock()
            .map(|pages| pages.generations.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn put(&self, path: &str, generation: u64, body: String) -> bool {
        let Ok(mut pages) = self.pages.lock() else {
            return false;
        };
        let current = pages.generations.get(path).copied().unwrap_or(0);
        if current != generation {
            tracing::debug!(
                "Page cache fill skipped for {} (generation {} != {})",
                path,
                generation,
                current
            );
            return false;
        }
        pages.entries.insert(
            path.to_string(),
            CachedPage {
                stored_at: Instant::now(),
                body,
            },
        );
        true
    }

    fn invalidate(&self, path: &str) {
        if let Ok(mut pages) = self.pages.lock() {
            *pages.generations.entry(path.to_string()).or_insert(0) += 1;
            if pages.entries.remove(path).is_some() {
                tracing::debug!("Page cache invalidated: {}", path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(cache: &InMemoryPageCache, path: &str, body: &str) -> bool {
        let generation = cache.generation(path);
        cache.put(path, generation, body.to_string())
    }

    #[test]
    fn test_put_get_invalidate() {
        let cache = InMemoryPageCache::default();
        assert!(cache.get("/").is_none());

        assert!(fill(&cache, "/", "[]"));
        assert!(fill(&cache, "/about", "[1]"));
        assert_eq!(cache.get("/").as_deref(), Some("[]"));

        cache.invalidate("/");
        assert!(cache.get("/").is_none());
        assert_eq!(cache.get("/about").as_deref(), Some("[1]"));

        // 失效不存在的路徑不應出錯
        cache.invalidate("/work/missing");
        assert_eq!(cache.len(), 1);

        // 失效後以新的世代號可以重新寫入
        assert!(fill(&cache, "/", "[2]"));
        assert_eq!(cache.get("/").as_deref(), Some("[2]"));
    }

    #[test]
    fn test_fill_started_before_invalidation_is_dropped() {
        let cache = InMemoryPageCache::default();

        // 讀取端先取得世代號，查詢期間資料被修改
        let generation = cache.generation("/");
        cache.invalidate("/");

        assert!(!cache.put("/", generation, "[\"old\"]".to_string()));
        assert!(cache.get("/").is_none());
        assert!(cache.is_empty());

        // 其他路徑的世代號不受影響
        let about = cache.generation("/about");
        assert!(cache.put("/about", about, "[]".to_string()));
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = InMemoryPageCache::new(Duration::ZERO);
        assert!(fill(&cache, "/", "[]"));
        assert!(cache.get("/").is_none());
        assert!(cache.is_empty());
    }
}
