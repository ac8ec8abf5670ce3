//! # AJAX 엔드포인트
//!
//! ## 엔드포인트
//! - `POST /api/v1/ajax/feedback` (폼 본문: `mood`, `message`, `email`)
//!
//! ## 응답
//! | 상황 | 상태 코드 | 본문 |
//! |------|-----------|------|
//! | 검증 통과 | 200 | `{"data":null,"status":"OK"}` |
//! | 검증 실패, 폼이 아닌 본문 | 400 | `{"data":null,"status":"ERROR"}` |
//!
//! 메일 전송 실패는 응답에 드러나지 않습니다. 검증을 통과하면 항상 OK입니다.

use axum::{
    extract::{rejection::FormRejection, State},
    http::{
        header::{COOKIE, REFERER, USER_AGENT},
        HeaderMap, HeaderName, StatusCode,
    },
    Form, Json,
};

use crate::{
    models::{AjaxResponse, AjaxStatus, FeedbackForm},
    services::feedback::{submit_feedback, FeedbackSubmission, RequestContext},
    state::AppState,
};

/// `POST /ajax/feedback`: 피드백을 검증하고 운영자에게 메일로 보냅니다.
pub async fn feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<FeedbackForm>, FormRejection>,
) -> (StatusCode, Json<AjaxResponse>) {
    // 폼으로 읽을 수 없는 본문도 검증 실패와 같은 ERROR 응답입니다.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Feedback form unreadable: {}", rejection);
            return error_response();
        }
    };

    let submission = match FeedbackSubmission::validate(&form.mood, &form.message, &form.email) {
        Ok(submission) => submission,
        Err(e) => {
            tracing::debug!("Feedback rejected: {}", e);
            return error_response();
        }
    };

    let context = RequestContext {
        referer: header_text(&headers, REFERER),
        user_agent: header_text(&headers, USER_AGENT),
        cookies: header_text(&headers, COOKIE),
    };

    submit_feedback(&state.mailer, &state.feedback_recipient, &submission, &context).await;

    (StatusCode::OK, Json(AjaxResponse::status(AjaxStatus::Ok)))
}

fn error_response() -> (StatusCode, Json<AjaxResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(AjaxResponse::status(AjaxStatus::Error)),
    )
}

/// 같은 이름의 헤더가 여러 개면 `; `로 이어 붙입니다. 없으면 빈 문자열
fn header_text(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ")
}
