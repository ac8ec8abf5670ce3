//! # 애플리케이션 공유 상태
//!
//! 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
//! Axum의 의존성 주입(Dependency Injection) 메커니즘이며,
//! 세션 ID와 사용자 ID는 여기가 아니라 요청마다 추출기로 전달됩니다.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::{Config, SearchSettings};
use crate::search::{BackendEntry, BackendRegistry, SessionMemory};
use crate::services::mailer::Mailer;

/// Axum의 State 추출기가 내부적으로 clone하므로 `Clone`이 필수입니다.
/// 무거운 필드는 모두 `Arc` 또는 내부적으로 Arc를 쓰는 타입이라 clone 비용이 작습니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 검색 결과 핸들러의 부수 효과 토글과 백엔드 식별자
    pub search: SearchSettings,
    /// 백엔드 식별자 → 백엔드 정의
    pub backends: Arc<BackendRegistry>,
    /// 세션별 마지막 검색과 결과 스크롤러
    pub memory: SessionMemory,
    pub mailer: Mailer,
    pub feedback_recipient: String,
}

impl AppState {
    /// 설정으로부터 상태를 만듭니다. 알 수 없는 검색 백엔드면 에러입니다.
    pub fn from_config(pool: SqlitePool, config: &Config) -> anyhow::Result<Self> {
        let state = Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            search: config.search.clone(),
            backends: Arc::new(BackendRegistry::builtin()),
            memory: SessionMemory::default(),
            mailer: Mailer::from_settings(&config.mail),
            feedback_recipient: config.mail.feedback_recipient.clone(),
        };

        if state.backend().is_none() {
            anyhow::bail!("Unknown search backend: {}", state.search.search_class_id);
        }

        Ok(state)
    }

    /// 설정된 검색 백엔드의 정의
    pub fn backend(&self) -> Option<&BackendEntry> {
        self.backends.get(&self.search.search_class_id)
    }
}
