//! 响应缓存
//!
//! 以规范化后的请求（方法 + 排序后的查询参数 + 请求体）为键，
//! 在内存中保存成功响应的原始字节，过期或超出容量时淘汰

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

struct CacheEntry {
    body: Vec<u8>,
    inserted_at: Instant,
}

/// 带过期时间和容量上限的响应缓存
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// 生成缓存键
    ///
    /// 查询参数（URL 自带的和额外传入的）合并后按键值排序，
    /// 保证参数顺序不同的同一请求命中同一条缓存
    pub fn key(method: &str, url: &str, query: &[(String, String)], body: Option<&[u8]>) -> String {
        let canonical_url = match Url::parse(url) {
            Ok(mut parsed) => {
                let mut pairs: Vec<(String, String)> = parsed
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                pairs.extend(query.iter().cloned());
                pairs.sort();

                if pairs.is_empty() {
                    parsed.set_query(None);
                } else {
                    parsed.query_pairs_mut().clear().extend_pairs(pairs);
                }
                parsed.to_string()
            }
            Err(_) => url.to_string(),
        };

        let mut key = format!("{} {}", method.to_uppercase(), canonical_url);
        if let Some(body) = body {
            key.push(' ');
            key.push_str(&String::from_utf8_lossy(body));
        }
        key
    }

    /// 读取未过期的缓存，过期条目顺带删除
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.body.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.inserted_at.elapsed() >= self.ttl {
                entries.remove(key);
            }
        }
        None
    }

    /// 写入缓存，容量已满时淘汰最早写入的条目
    pub async fn insert(&self, key: String, body: Vec<u8>) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                body,
                inserted_at: Instant::now(),
            },
        );
    }

    /// 清除所有过期条目，返回清除数量
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        before - entries.len()
    }

    /// 清空缓存，返回清除数量
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_sorts_query_params() {
        let a = ResponseCache::key(
            "get",
            "http://example.com/api?b=2&a=1",
            &[],
            None,
        );
        let b = ResponseCache::key(
            "GET",
            "http://example.com/api",
            &[("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())],
            None,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_includes_method_and_body() {
        let get = ResponseCache::key("GET", "http://example.com/api", &[], None);
        let post = ResponseCache::key("POST", "http://example.com/api", &[], Some(b"{\"x\":1}"));
        let post2 = ResponseCache::key("POST", "http://example.com/api", &[], Some(b"{\"x\":2}"));
        assert_ne!(get, post);
        assert_ne!(post, post2);
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        cache.insert("k".to_string(), b"hello".to_vec()).await;

        assert_eq!(cache.get("k").await, Some(b"hello".to_vec()));
        assert_eq!(cache.get("missing").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_removed() {
        let cache = ResponseCache::new(Duration::ZERO, 10);
        cache.insert("k".to_string(), b"hello".to_vec()).await;

        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_evicts_oldest_when_full() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), b"1".to_vec()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("b".to_string(), b"2".to_vec()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("c".to_string(), b"3".to_vec()).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(b"2".to_vec()));
        assert_eq!(cache.get("c").await, Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), b"1".to_vec()).await;
        cache.insert("b".to_string(), b"2".to_vec()).await;
        cache.insert("a".to_string(), b"3".to_vec()).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, Some(b"3".to_vec()));
        assert_eq!(cache.get("b").await, Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let expired = ResponseCache::new(Duration::ZERO, 10);
        expired.insert("a".to_string(), vec![]).await;
        expired.insert("b".to_string(), vec![]).await;
        assert_eq!(expired.purge_expired().await, 2);

        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        cache.insert("a".to_string(), vec![]).await;
        assert_eq!(cache.purge_expired().await, 0);
        assert_eq!(cache.clear().await, 1);
        assert_eq!(cache.len().await, 0);
    }
}
