//! SessionKnowledgeCache — memoizes compressed fragments and tracks which
//! tools were already injected into a session.
//!
//! Keys are scoped to (tool, version, session, truncated query, hour
//! bucket), so two turns in the same session asking roughly the same thing
//! within the hour hit the cache instead of re-spending compression work.
//! Entries expire after a fixed TTL and the oldest inserted key is evicted
//! once the cache is full (insertion-order eviction, not strict LRU).

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use chrono::Utc;
use sha2::{Digest, Sha256};
use skillforge_core::SkillError;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
/// Default maximum entry count.
pub const DEFAULT_MAX_ENTRIES: usize = 100;
/// Queries are truncated to this many characters before keying.
const QUERY_KEY_CHARS: usize = 64;

/// Counts removed by `clear_session`, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearedCounts {
    pub cache_entries: usize,
    pub injected_tools: usize,
}

struct CacheEntry {
    content: String,
    session_id: String,
    created_at: Instant,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    insertion_order: VecDeque<String>,
    /// Per-session set of tool names already injected.
    injected: HashMap<String, HashSet<String>>,
}

/// Session-scoped cache of compressed knowledge fragments.
///
/// Safe for concurrent reads and independent per-key writes; sessions never
/// contend beyond the map locks since keys are session-scoped.
pub struct SessionKnowledgeCache {
    ttl: Duration,
    max_entries: usize,
    inner: RwLock<CacheInner>,
}

impl Default for SessionKnowledgeCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl SessionKnowledgeCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    /// Look up a fragment. Expired entries read as absent.
    pub async fn get(
        &self,
        tool_name: &str,
        version: &str,
        session_id: &str,
        query: &str,
    ) -> Option<String> {
        if let Err(err) = integrity_check(session_id) {
            warn!(error = %err, "Bypassing knowledge cache read");
            return None;
        }
        let key = cache_key(tool_name, version, session_id, query);
        let inner = self.inner.read().await;
        let entry = inner.entries.get(&key)?;
        if entry.created_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.content.clone())
    }

    /// Store a fragment, evicting the oldest inserted key when full.
    pub async fn set(
        &self,
        tool_name: &str,
        version: &str,
        session_id: &str,
        query: &str,
        content: String,
    ) {
        if let Err(err) = integrity_check(session_id) {
            warn!(error = %err, "Bypassing knowledge cache write");
            return;
        }
        let key = cache_key(tool_name, version, session_id, query);
        let mut inner = self.inner.write().await;

        while inner.entries.len() >= self.max_entries {
            let Some(oldest) = inner.insertion_order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }

        if inner.entries.insert(
            key.clone(),
            CacheEntry {
                content,
                session_id: session_id.to_string(),
                created_at: Instant::now(),
            },
        ).is_none()
        {
            inner.insertion_order.push_back(key);
        }
    }

    /// Mark a tool's guide as injected into a session.
    pub async fn record_injected(&self, session_id: &str, tool_name: &str) {
        let mut inner = self.inner.write().await;
        inner
            .injected
            .entry(session_id.to_string())
            .or_default()
            .insert(tool_name.to_string());
    }

    /// Whether a tool's guide was already injected into a session.
    ///
    /// Callers should request reference-level compression when this returns
    /// true, to avoid re-spending context budget on material the model has
    /// already seen.
    pub async fn has_injected(&self, session_id: &str, tool_name: &str) -> bool {
        let inner = self.inner.read().await;
        inner
            .injected
            .get(session_id)
            .is_some_and(|tools| tools.contains(tool_name))
    }

    /// Remove all state scoped to a session: cache entries, the injection
    /// history, and nothing else.
    ///
    /// The session id is shape-checked first so a malformed id cannot cause
    /// collateral deletion.
    pub async fn clear_session(&self, session_id: &str) -> ClearedCounts {
        if let Err(err) = integrity_check(session_id) {
            warn!(error = %err, "Refusing to clear session");
            return ClearedCounts::default();
        }

        let mut inner = self.inner.write().await;

        let stale: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, e)| e.session_id == session_id)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            inner.entries.remove(key);
        }
        inner.insertion_order.retain(|k| !stale.contains(k));

        let injected_tools = inner
            .injected
            .remove(session_id)
            .map(|tools| tools.len())
            .unwrap_or(0);

        let counts = ClearedCounts {
            cache_entries: stale.len(),
            injected_tools,
        };
        debug!(
            session = %session_id,
            cache_entries = counts.cache_entries,
            injected_tools = counts.injected_tools,
            "Cleared session state"
        );
        counts
    }

    /// Current live entry count (expired entries included until touched).
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Session ids are opaque but must look like identifiers: non-empty,
/// bounded, alphanumeric plus `-`/`_`.
fn valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id.len() <= 128
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A malformed session id is a cache integrity problem, never a fatal one:
/// callers bypass the cache and carry on.
fn integrity_check(session_id: &str) -> Result<(), SkillError> {
    if valid_session_id(session_id) {
        Ok(())
    } else {
        Err(SkillError::CacheIntegrity(format!(
            "malformed session id: {session_id:?}"
        )))
    }
}

/// Key = sha256(tool | version | session | truncated query | hour bucket).
fn cache_key(tool_name: &str, version: &str, session_id: &str, query: &str) -> String {
    let truncated: String = query.chars().take(QUERY_KEY_CHARS).collect();
    let bucket = Utc::now().format("%Y%m%d%H");
    let mut hasher = Sha256::new();
    hasher.update(tool_name.as_bytes());
    hasher.update(b"|");
    hasher.update(version.as_bytes());
    hasher.update(b"|");
    hasher.update(session_id.as_bytes());
    hasher.update(b"|");
    hasher.update(truncated.as_bytes());
    hasher.update(b"|");
    hasher.update(bucket.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = SessionKnowledgeCache::default();
        cache.set("tavily_search", "1", "sess-1", "chips", "fragment".into()).await;
        let hit = cache.get("tavily_search", "1", "sess-1", "chips").await;
        assert_eq!(hit.as_deref(), Some("fragment"));
    }

    #[tokio::test]
    async fn different_session_misses() {
        let cache = SessionKnowledgeCache::default();
        cache.set("tavily_search", "1", "sess-1", "chips", "fragment".into()).await;
        assert!(cache.get("tavily_search", "1", "sess-2", "chips").await.is_none());
    }

    #[tokio::test]
    async fn different_version_misses() {
        let cache = SessionKnowledgeCache::default();
        cache.set("tavily_search", "1", "sess-1", "chips", "fragment".into()).await;
        assert!(cache.get("tavily_search", "2", "sess-1", "chips").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let cache = SessionKnowledgeCache::new(Duration::from_millis(10), 100);
        cache.set("tavily_search", "1", "sess-1", "chips", "fragment".into()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("tavily_search", "1", "sess-1", "chips").await.is_none());
    }

    #[tokio::test]
    async fn eviction_removes_oldest_inserted() {
        let cache = SessionKnowledgeCache::new(DEFAULT_TTL, 3);
        for i in 0..4 {
            cache.set("tool", "1", "sess-1", &format!("query {i}"), format!("v{i}")).await;
        }
        assert_eq!(cache.len().await, 3);
        assert!(cache.get("tool", "1", "sess-1", "query 0").await.is_none());
        assert!(cache.get("tool", "1", "sess-1", "query 3").await.is_some());
    }

    #[tokio::test]
    async fn injection_history_lifecycle() {
        let cache = SessionKnowledgeCache::default();
        assert!(!cache.has_injected("sess-1", "python_sandbox").await);

        cache.record_injected("sess-1", "python_sandbox").await;
        assert!(cache.has_injected("sess-1", "python_sandbox").await);
        // Other sessions are unaffected.
        assert!(!cache.has_injected("sess-2", "python_sandbox").await);

        cache.clear_session("sess-1").await;
        assert!(!cache.has_injected("sess-1", "python_sandbox").await);
    }

    #[tokio::test]
    async fn clear_session_reports_counts_and_spares_others() {
        let cache = SessionKnowledgeCache::default();
        cache.set("tool_a", "1", "sess-1", "q1", "a".into()).await;
        cache.set("tool_b", "1", "sess-1", "q2", "b".into()).await;
        cache.set("tool_a", "1", "sess-2", "q1", "c".into()).await;
        cache.record_injected("sess-1", "tool_a").await;

        let counts = cache.clear_session("sess-1").await;
        assert_eq!(counts.cache_entries, 2);
        assert_eq!(counts.injected_tools, 1);
        assert!(cache.get("tool_a", "1", "sess-2", "q1").await.is_some());
    }

    #[tokio::test]
    async fn malformed_session_id_clears_nothing() {
        let cache = SessionKnowledgeCache::default();
        cache.set("tool_a", "1", "sess-1", "q1", "a".into()).await;

        let counts = cache.clear_session("../*").await;
        assert_eq!(counts, ClearedCounts::default());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn malformed_session_id_bypasses_reads_and_writes() {
        let cache = SessionKnowledgeCache::default();
        cache
            .set("tool_a", "1", "bad session!", "q1", "a".into())
            .await;
        assert!(cache.is_empty().await);
        assert!(cache.get("tool_a", "1", "bad session!", "q1").await.is_none());
    }

    #[test]
    fn session_id_shape_check() {
        assert!(valid_session_id("sess_42-abc"));
        assert!(!valid_session_id(""));
        assert!(!valid_session_id("has spaces"));
        assert!(!valid_session_id(&"x".repeat(200)));
    }

    #[test]
    fn query_truncation_shares_keys() {
        let long_a = format!("{}{}", "q".repeat(80), "tail-a");
        let long_b = format!("{}{}", "q".repeat(80), "tail-b");
        assert_eq!(
            cache_key("tool", "1", "sess", &long_a),
            cache_key("tool", "1", "sess", &long_b)
        );
    }
}
