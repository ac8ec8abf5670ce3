//! # 피드백 서비스
//!
//! 사용자가 보낸 기분(mood)/메시지/이메일 폼을 검증하고,
//! 운영자에게 보낼 평문 보고서를 만들어 메일로 전달합니다.
//!
//! ## 검증 규칙
//! - mood는 "" (선택 안 함), "1", "2", "3" 중 하나여야 합니다.
//! - message는 앞뒤 공백을 제거한 뒤 비어 있으면 안 됩니다.
//! - email은 선택 항목이며 형식을 검사하지 않습니다.
//!
//! ## 보고서 형식
//! ```text
//! Mood: Okay.
//!
//! <메시지>
//!
//!
//! E-Mail: <이메일>          ← 이메일이 있을 때만
//! ----------------------------------------------------------------------------------------------
//! Current page: <Referer>
//! Browser:      <User-Agent>
//! Cookies:      <Cookie>
//! ----------------------------------------------------------------------------------------------
//! ```

use thiserror::Error;

use super::mailer::{Mailer, OutgoingMail};

pub const FEEDBACK_SUBJECT: &str = "Feedback";

const SEPARATOR: &str =
    "----------------------------------------------------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Good,
    Okay,
    Bad,
    Unspecified,
}

impl Mood {
    /// 폼 값에서 Mood를 찾습니다. 알 수 없는 코드면 None
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Mood::Good),
            "2" => Some(Mood::Okay),
            "3" => Some(Mood::Bad),
            "" => Some(Mood::Unspecified),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Good => "Good",
            Mood::Okay => "Okay",
            Mood::Bad => "Bad",
            Mood::Unspecified => "Not specified",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("unknown mood value")]
    UnknownMood,

    #[error("message must not be empty")]
    EmptyMessage,
}

/// 검증을 통과한 피드백 (요청 하나 동안만 존재)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub mood: Mood,
    pub message: String,
    pub email: Option<String>,
}

impl FeedbackSubmission {
    /// 폼 값들을 HTML 이스케이프한 뒤 검증합니다.
    pub fn validate(mood: &str, message: &str, email: &str) -> Result<Self, FeedbackError> {
        let mood = Mood::from_code(&escape_html(mood)).ok_or(FeedbackError::UnknownMood)?;

        let message = escape_html(message);
        if message.trim().is_empty() {
            return Err(FeedbackError::EmptyMessage);
        }

        let email = escape_html(email);
        Ok(Self {
            mood,
            message,
            email: (!email.is_empty()).then_some(email),
        })
    }
}

/// 보고서에 함께 적는 요청 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub referer: String,
    pub user_agent: String,
    pub cookies: String,
}

/// 운영자에게 보낼 평문 보고서를 만듭니다.
pub fn compose_report(submission: &FeedbackSubmission, context: &RequestContext) -> String {
    let mut report = format!("Mood: {}.\n\n", submission.mood.label());
    report.push_str(&submission.message);
    report.push_str("\n\n");

    if let Some(email) = &submission.email {
        report.push('\n');
        report.push_str("E-Mail: ");
        report.push_str(email);
        report.push('\n');
    }

    report.push_str(SEPARATOR);
    report.push('\n');
    report.push_str(&format!("Current page: {}\n", context.referer));
    report.push_str(&format!("Browser:      {}\n", escape_html(&context.user_agent)));
    report.push_str(&format!("Cookies:      {}\n", escape_html(&context.cookies)));
    report.push_str(SEPARATOR);
    report.push('\n');
    report
}

/// 보고서를 메일로 한 번 보냅니다.
///
/// 전송에 실패해도 호출자에게 알리지 않고 경고 로그만 남깁니다.
pub async fn submit_feedback(
    mailer: &Mailer,
    recipient: &str,
    submission: &FeedbackSubmission,
    context: &RequestContext,
) {
    let mail = OutgoingMail {
        to: recipient.to_string(),
        subject: FEEDBACK_SUBJECT.to_string(),
        body: compose_report(submission, context),
    };

    match mailer.send(&mail).await {
        Ok(()) => tracing::info!(mood = submission.mood.label(), "Feedback sent"),
        Err(e) => tracing::warn!("Feedback mail could not be sent: {}", e),
    }
}

/// HTML 특수 문자를 엔티티로 바꿉니다.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
