//! # 세션 메모리
//!
//! 세션마다 두 가지를 프로세스 메모리에 보관합니다.
//! - 마지막 검색 URL ("검색 결과로 돌아가기" 링크)
//! - 결과 스크롤러
//!
//! 서버 재시작 시 사라져도 되는 값들이므로 DB가 아닌 메모리에 둡니다.
//! 세션 수는 `MAX_SESSIONS`로 제한되며, 넘치면 가장 오래 사용되지 않은 세션을 버립니다.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::scroller::{ResultScroller, ScrollPosition};

pub const MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct SessionEntry {
    last_search: Option<String>,
    scroller: Option<ResultScroller>,
    /// 마지막으로 갱신된 순번 (작을수록 오래됨)
    touched_at: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    /// touched_at → 세션 ID. 항상 `entries`와 같은 세션 집합을 가집니다.
    touch_order: BTreeMap<u64, String>,
    clock: u64,
}

/// 세션 ID → 세션별 검색 상태
///
/// `Arc` 안에 들어 있으므로 clone해도 같은 저장소를 가리킵니다.
#[derive(Debug, Clone)]
pub struct SessionMemory {
    inner: Arc<RwLock<Sessions>>,
    capacity: usize,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionMemory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    /// 현재 검색의 URL을 세션의 "마지막 검색"으로 기억합니다.
    pub async fn remember_search(&self, session_id: &str, url: String) {
        self.update(session_id, |entry| entry.last_search = Some(url))
            .await;
    }

    pub async fn last_search(&self, session_id: &str) -> Option<String> {
        self.inner
            .read()
            .await
            .entries
            .get(session_id)
            .and_then(|entry| entry.last_search.clone())
    }

    pub async fn init_scroller(&self, session_id: &str, scroller: ResultScroller) {
        self.update(session_id, |entry| entry.scroller = Some(scroller))
            .await;
    }

    /// 세션의 스크롤러에서 레코드의 이전/다음 위치를 찾습니다.
    pub async fn scroll_position(&self, session_id: &str, record_id: &str) -> Option<ScrollPosition> {
        self.inner
            .read()
            .await
            .entries
            .get(session_id)
            .and_then(|entry| entry.scroller.as_ref())
            .and_then(|scroller| scroller.neighbours(record_id))
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        let sessions = self.inner.read().await;
        assert_eq!(sessions.entries.len(), sessions.touch_order.len());
        sessions.entries.len()
    }

    async fn update(&self, session_id: &str, apply: impl FnOnce(&mut SessionEntry)) {
        let mut guard = self.inner.write().await;
        let sessions = &mut *guard;
        sessions.clock += 1;
        let now = sessions.clock;

        if let Some(entry) = sessions.entries.get(session_id) {
            sessions.touch_order.remove(&entry.touched_at);
        } else if sessions.entries.len() >= self.capacity {
            // touch_order의 첫 항목이 가장 오래 사용되지 않은 세션입니다.
            if let Some((_, oldest)) = sessions.touch_order.pop_first() {
                tracing::debug!(session = %oldest, "Evicting session search memory");
                sessions.entries.remove(&oldest);
            }
        }

        let entry = sessions
            .entries
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                last_search: None,
                scroller: None,
                touched_at: now,
            });
        entry.touched_at = now;
        apply(entry);
        sessions.touch_order.insert(now, session_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remembers_last_search_per_session() {
        let memory = SessionMemory::default();
        memory.remember_search("s1", "/a".to_string()).await;
        memory.remember_search("s1", "/b".to_string()).await;
        memory.remember_search("s2", "/c".to_string()).await;

        assert_eq!(memory.last_search("s1").await.as_deref(), Some("/b"));
        assert_eq!(memory.last_search("s2").await.as_deref(), Some("/c"));
        assert_eq!(memory.last_search("s3").await, None);
    }

    #[tokio::test]
    async fn evicts_least_recently_touched_session() {
        let memory = SessionMemory::with_capacity(2);
        memory.remember_search("s1", "/1".to_string()).await;
        memory.remember_search("s2", "/2".to_string()).await;
        memory.remember_search("s1", "/1b".to_string()).await;
        memory.remember_search("s3", "/3".to_string()).await;

        assert_eq!(memory.len().await, 2);
        assert_eq!(memory.last_search("s2").await, None);
        assert_eq!(memory.last_search("s1").await.as_deref(), Some("/1b"));
    }

    #[tokio::test]
    async fn eviction_follows_touch_order_across_many_sessions() {
        let memory = SessionMemory::with_capacity(3);
        for id in ["a", "b", "c"] {
            memory.remember_search(id, format!("/{id}")).await;
        }
        // a를 다시 사용하면 b가 가장 오래된 세션이 됩니다.
        memory.init_scroller("a", scroller_for("/a")).await;
        memory.remember_search("d", "/d".to_string()).await;
        memory.remember_search("e", "/e".to_string()).await;

        assert_eq!(memory.len().await, 3);
        assert_eq!(memory.last_search("b").await, None);
        assert_eq!(memory.last_search("c").await, None);
        assert_eq!(memory.last_search("a").await.as_deref(), Some("/a"));
        assert_eq!(memory.last_search("e").await.as_deref(), Some("/e"));
    }

    fn scroller_for(url: &str) -> ResultScroller {
        ResultScroller {
            search_id: None,
            search_url: url.to_string(),
            page: 1,
            limit: 20,
            total: 0,
            record_ids: Vec::new(),
        }
    }
}
