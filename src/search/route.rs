//! 이름이 붙은 라우트와 그 URL 생성
//!
//! 리다이렉트 대상은 `{라우트 이름, 경로 파라미터, 쿼리 문자열}` 세 가지로
//! 표현됩니다. 실제 경로 문자열은 `Route::pattern()` 한 곳에서만 정의합니다.

use url::form_urlencoded;

/// 리다이렉트나 링크의 대상이 될 수 있는 라우트
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SearchResults,
    SearchAdvanced,
    Record,
}

impl Route {
    pub fn name(self) -> &'static str {
        match self {
            Route::SearchResults => "search-results",
            Route::SearchAdvanced => "search-advanced",
            Route::Record => "record",
        }
    }

    /// `/api/v1` 접두사를 포함한 경로 패턴. `{name}` 부분이 파라미터로 치환됩니다.
    pub fn pattern(self) -> &'static str {
        match self {
            Route::SearchResults => "/api/v1/search/results",
            Route::SearchAdvanced => "/api/v1/search/advanced",
            Route::Record => "/api/v1/records/{id}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub route: Route,
    pub params: Vec<(&'static str, String)>,
    /// `?` 없이 인코딩된 쿼리 문자열 (비어 있을 수 있음)
    pub query: String,
}

impl RouteTarget {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            params: Vec::new(),
            query: String::new(),
        }
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// 경로 파라미터를 치환하고 쿼리 문자열을 붙인 URL을 만듭니다.
    pub fn to_url(&self) -> String {
        let mut path = self.route.pattern().to_string();
        for (name, value) in &self.params {
            let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
            path = path.replace(&format!("{{{name}}}"), &encoded);
        }

        if self.query.is_empty() {
            path
        } else {
            format!("{path}?{}", self.query)
        }
    }
}
