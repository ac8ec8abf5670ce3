//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `SEARCH_CLASS_ID`: 사용할 검색 백엔드 식별자 (기본값 "Index")
//! - `SAVE_TO_HISTORY` / `REMEMBER_SEARCH` / `USE_RESULT_SCROLLER`: 검색 후처리 토글
//! - `FEEDBACK_RECIPIENT`: 피드백 메일 수신 주소
//! - `MAIL_TRANSPORT` / `MAIL_OUTBOX_PATH`: 메일 전송 방식과 outbox 디렉토리

use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/katalog.db")
    pub database_url: String,
    /// JWT 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 검색 결과 핸들러의 동작 설정
    pub search: SearchSettings,
    /// 피드백 메일 설정
    pub mail: MailSettings,
}

/// 검색 결과 핸들러가 수행하는 부수 효과들의 on/off 스위치
///
/// 세 가지 모두 서로 독립적으로 켜고 끌 수 있습니다.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// 검색 백엔드 레지스트리의 키
    pub search_class_id: String,
    /// 검색마다 검색 기록(search 테이블)에 저장할지 여부
    pub save_to_history: bool,
    /// 세션의 "마지막 검색" URL을 기억할지 여부
    pub remember_search: bool,
    /// 결과 스크롤러(이전/다음 레코드 이동)를 초기화할지 여부
    pub use_result_scroller: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            search_class_id: "Index".to_string(),
            save_to_history: true,
            remember_search: true,
            use_result_scroller: true,
        }
    }
}

/// 메일 전송 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    /// outbox 디렉토리에 메일 파일을 기록합니다.
    Outbox,
    /// 메일 내용을 로그로만 남깁니다.
    Log,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    /// 피드백을 받을 운영자 주소
    pub feedback_recipient: String,
    pub transport: MailTransport,
    pub outbox_path: String,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = SearchSettings::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            search: SearchSettings {
                search_class_id: env::var("SEARCH_CLASS_ID")
                    .unwrap_or(defaults.search_class_id),
                save_to_history: env_flag("SAVE_TO_HISTORY", defaults.save_to_history),
                remember_search: env_flag("REMEMBER_SEARCH", defaults.remember_search),
                use_result_scroller: env_flag(
                    "USE_RESULT_SCROLLER",
                    defaults.use_result_scroller,
                ),
            },
            mail: MailSettings {
                feedback_recipient: env::var("FEEDBACK_RECIPIENT")
                    .unwrap_or_else(|_| "feedback@localhost".to_string()),
                transport: match env::var("MAIL_TRANSPORT").as_deref() {
                    Ok("log") => MailTransport::Log,
                    _ => MailTransport::Outbox,
                },
                outbox_path: env::var("MAIL_OUTBOX_PATH")
                    .unwrap_or_else(|_| "data/outbox".to_string()),
            },
        })
    }
}

/// 불리언 환경변수를 읽습니다. 알 수 없는 값이면 기본값을 사용합니다.
fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
