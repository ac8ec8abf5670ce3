//! 결과 스크롤러: 레코드 상세 화면에서 같은 검색 결과의 이전/다음 레코드로 이동하기 위한 상태
//!
//! 검색 결과 화면이 렌더링될 때 현재 페이지의 레코드 ID 목록을 세션에 기록해두고,
//! 상세 화면은 그 목록에서 자신의 위치를 찾습니다. 페이지 경계를 넘는 이동은 하지 않습니다.

use serde::Serialize;

use super::backend::SearchResults;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultScroller {
    /// 검색 기록에 저장된 경우 그 ID
    pub search_id: Option<String>,
    pub search_url: String,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub record_ids: Vec<String>,
}

/// 상세 화면에 함께 내려주는 스크롤 위치 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollPosition {
    pub previous: Option<String>,
    pub next: Option<String>,
    /// 전체 결과에서 1부터 시작하는 위치
    pub position: u64,
    pub total: u64,
    pub search_url: String,
}

impl ResultScroller {
    pub fn init(results: &SearchResults, search_id: Option<String>, search_url: String) -> Self {
        Self {
            search_id,
            search_url,
            page: results.params.page,
            limit: results.params.limit,
            total: results.total,
            record_ids: results.records.iter().map(|r| r.id.clone()).collect(),
        }
    }

    pub fn neighbours(&self, record_id: &str) -> Option<ScrollPosition> {
        let index = self.record_ids.iter().position(|id| id == record_id)?;
        let page_offset = u64::from(self.page.saturating_sub(1)) * u64::from(self.limit);

        Some(ScrollPosition {
            previous: index
                .checked_sub(1)
                .and_then(|i| self.record_ids.get(i))
                .cloned(),
            next: self.record_ids.get(index + 1).cloned(),
            position: page_offset + index as u64 + 1,
            total: self.total,
            search_url: self.search_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroller(page: u32) -> ResultScroller {
        ResultScroller {
            search_id: None,
            search_url: "/api/v1/search/results?lookfor=x&type=AllFields".to_string(),
            page,
            limit: 3,
            total: 8,
            record_ids: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    #[test]
    fn middle_record_has_both_neighbours() {
        let position = scroller(1).neighbours("b").unwrap();
        assert_eq!(position.previous.as_deref(), Some("a"));
        assert_eq!(position.next.as_deref(), Some("c"));
        assert_eq!(position.position, 2);
        assert_eq!(position.total, 8);
    }

    #[test]
    fn edges_and_later_pages() {
        let first = scroller(2).neighbours("a").unwrap();
        assert_eq!(first.previous, None);
        assert_eq!(first.position, 4);

        let last = scroller(2).neighbours("c").unwrap();
        assert_eq!(last.next, None);
        assert_eq!(last.position, 6);
    }

    #[test]
    fn unknown_record_has_no_position() {
        assert!(scroller(1).neighbours("zzz").is_none());
    }
}
