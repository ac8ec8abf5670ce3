use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, REFERER, SET_COOKIE, USER_AGENT},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

use katalog::{
    config::SearchSettings,
    db,
    middleware::auth::create_access_token,
    router,
    search::{BackendRegistry, SessionMemory},
    services::mailer::{Mailer, MemoryMailer},
    AppState,
};

const SECRET: &str = "test-secret";
const FORM: &str = "application/x-www-form-urlencoded";

struct TestApp {
    app: Router,
    pool: SqlitePool,
    mailer: MemoryMailer,
}

async fn setup_with(search: SearchSettings) -> TestApp {
    // 메모리 DB는 연결마다 별개이므로 연결 하나만 씁니다.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let mailer = MemoryMailer::new();
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: SECRET.to_string(),
        search,
        backends: Arc::new(BackendRegistry::builtin()),
        memory: SessionMemory::default(),
        mailer: Mailer::Memory(mailer.clone()),
        feedback_recipient: "ops@localhost".to_string(),
    };

    TestApp {
        app: router(state),
        pool,
        mailer,
    }
}

async fn setup() -> TestApp {
    setup_with(SearchSettings::default()).await
}

async fn seed_books(pool: &SqlitePool) {
    let books = [
        ("b1", "Programming Rust", "Jim Blandy", 2021),
        ("b2", "Rust in Action", "Tim McNamara", 2021),
        ("b3", "The Rust Programming Language", "Steve Klabnik", 2019),
        ("b4", "Zero To Production In Rust", "Luca Palmieri", 2022),
        ("b5", "Learning Go", "Jon Bodner", 2021),
    ];
    for (id, title, author, year) in books {
        db::insert_record(pool, id, title, Some(author), Some(year), None)
            .await
            .expect("insert record");
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    async fn get(&self, uri: &str, session: &str) -> Response {
        self.send(
            Request::get(uri)
                .header(COOKIE, format!("katalog_sid={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect has a location")
}

#[tokio::test]
async fn health_reports_backend() {
    let test = setup().await;
    let response = test.get("/api/v1/health", "s1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["search_backend"], "Index");
}

#[tokio::test]
async fn new_visitors_receive_a_session_cookie() {
    let test = setup().await;

    let response = test
        .send(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await;
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("session cookie issued");
    assert!(cookie.starts_with("katalog_sid="));
    assert!(cookie.contains("HttpOnly"));

    let response = test.get("/api/v1/health", "known").await;
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn feedback_is_mailed_once() {
    let test = setup().await;

    let response = test
        .send(
            Request::post("/api/v1/ajax/feedback")
                .header(CONTENT_TYPE, FORM)
                .header(REFERER, "http://localhost/search")
                .header(USER_AGENT, "curl/8")
                .header(COOKIE, "katalog_sid=s1")
                .body(Body::from("mood=2&message=Search+is+slow&email=a%40b.c"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "OK");
    assert!(body["data"].is_null());

    let sent = test.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ops@localhost");
    assert_eq!(sent[0].subject, "Feedback");
    assert!(sent[0].body.starts_with("Mood: Okay.\n\nSearch is slow\n\n"));
    assert!(sent[0].body.contains("E-Mail: a@b.c\n"));
    assert!(sent[0].body.contains("Current page: http://localhost/search\n"));
    assert!(sent[0].body.contains("Browser:      curl/8\n"));
    assert!(sent[0].body.contains("Cookies:      katalog_sid=s1\n"));
}

#[tokio::test]
async fn invalid_feedback_is_rejected_without_mail() {
    let test = setup().await;

    for form in ["mood=7&message=hello", "mood=1&message=+++", "mood=1"] {
        let response = test
            .send(
                Request::post("/api/v1/ajax/feedback")
                    .header(CONTENT_TYPE, FORM)
                    .body(Body::from(form))
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{form}");
        assert_eq!(json_body(response).await["status"], "ERROR");
    }

    assert!(test.mailer.sent().is_empty());
}

#[tokio::test]
async fn feedback_succeeds_even_when_mail_fails() {
    let mut test = setup().await;
    let pool = test.pool.clone();
    let state = AppState {
        pool,
        jwt_secret: SECRET.to_string(),
        search: SearchSettings::default(),
        backends: Arc::new(BackendRegistry::builtin()),
        memory: SessionMemory::default(),
        mailer: Mailer::Memory(MemoryMailer::failing()),
        feedback_recipient: "ops@localhost".to_string(),
    };
    test.app = router(state);

    let response = test
        .send(
            Request::post("/api/v1/ajax/feedback")
                .header(CONTENT_TYPE, FORM)
                .body(Body::from("mood=&message=hi"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "OK");
}

#[tokio::test]
async fn basic_search_renders_results_and_saves_history() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let response = test
        .get("/api/v1/search/results?lookfor=rust&type=Title&sort=title", "s1")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["parse_error"], false);
    assert_eq!(body["total"], 4);
    assert_eq!(body["lookfor"], "rust");
    assert_eq!(body["search_type"], "basic");
    assert_eq!(body["results"][0]["id"], "b1");
    assert_eq!(
        body["search_url"],
        "/api/v1/search/results?lookfor=rust&type=Title&sort=title"
    );
    assert!(body["search_id"].is_string());
}

#[tokio::test]
async fn form_body_overrides_query_parameters() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let response = test
        .send(
            Request::post("/api/v1/search/results?lookfor=go")
                .header(CONTENT_TYPE, FORM)
                .header(COOKIE, "katalog_sid=s1")
                .body(Body::from("lookfor=klabnik&type=Author"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["lookfor"], "klabnik");
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["id"], "b3");
}

#[tokio::test]
async fn advanced_rows_are_joined() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let response = test
        .get(
            "/api/v1/search/results?lookfor0=rust&type0=Title&lookfor1=klabnik&type1=Author&join=AND",
            "s1",
        )
        .await;
    let body = json_body(response).await;
    assert_eq!(body["search_type"], "advanced");
    assert_eq!(body["total"], 1);
    assert_eq!(body["lookfor"], "rust AND klabnik");
}

#[tokio::test]
async fn jumpto_redirects_to_the_addressed_record() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let response = test
        .get("/api/v1/search/results?lookfor=rust&sort=title&jumpto=2", "s1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/api/v1/records/b2");
}

#[tokio::test]
async fn out_of_range_jumpto_renders_normally() {
    let test = setup().await;
    seed_books(&test.pool).await;

    for jumpto in ["99", "0", "abc"] {
        let uri = format!("/api/v1/search/results?lookfor=rust&jumpto={jumpto}");
        let response = test.get(&uri, "s1").await;
        assert_eq!(response.status(), StatusCode::OK, "jumpto={jumpto}");
    }
}

#[tokio::test]
async fn unparseable_queries_render_empty_results() {
    let test = setup().await;
    seed_books(&test.pool).await;

    for lookfor in ["%22unbalanced", "nosuchfield%3Afoo"] {
        let uri = format!("/api/v1/search/results?lookfor={lookfor}");
        let response = test.get(&uri, "s1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["parse_error"], true, "{lookfor}");
        assert_eq!(body["total"], 0);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(0));
        assert!(body["search_id"].is_null());
    }

    // 파싱 실패한 검색은 기록에 남지 않습니다.
    let history = json_body(test.get("/api/v1/search/history", "s1").await).await;
    assert_eq!(history["searches"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn saved_search_redirects_for_the_same_session() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let body = json_body(
        test.get("/api/v1/search/results?lookfor=rust&type=Title", "s1")
            .await,
    )
    .await;
    let search_id = body["search_id"].as_str().unwrap().to_string();

    let response = test
        .get(&format!("/api/v1/search/results?saved={search_id}"), "s1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/api/v1/search/results?lookfor=rust&type=Title"
    );
}

#[tokio::test]
async fn saved_search_of_another_session_is_denied() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let body = json_body(test.get("/api/v1/search/results?lookfor=rust", "s1").await).await;
    let search_id = body["search_id"].as_str().unwrap().to_string();

    let response = test
        .get(&format!("/api/v1/search/results?saved={search_id}"), "s2")
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "access_denied");

    let response = test.get("/api/v1/search/results?saved=missing", "s1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_restores_saved_search_from_another_session() {
    let test = setup().await;
    seed_books(&test.pool).await;
    let token = create_access_token("user-1", SECRET).unwrap();

    let response = test
        .send(
            Request::get("/api/v1/search/results?lookfor=go")
                .header(COOKIE, "katalog_sid=laptop")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let search_id = json_body(response).await["search_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test
        .send(
            Request::get(format!("/api/v1/search/results?saved={search_id}"))
                .header(COOKIE, "katalog_sid=phone")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/api/v1/search/results?lookfor=go&type=AllFields"
    );
}

#[tokio::test]
async fn repeated_searches_are_stored_once() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let first = json_body(test.get("/api/v1/search/results?lookfor=rust", "s1").await).await;
    let second = json_body(test.get("/api/v1/search/results?lookfor=rust", "s1").await).await;
    assert_eq!(first["search_id"], second["search_id"]);
    test.get("/api/v1/search/results?lookfor=go", "s1").await;

    let history = json_body(test.get("/api/v1/search/history", "s1").await).await;
    let searches = history["searches"].as_array().unwrap();
    assert_eq!(searches.len(), 2);
    assert_eq!(searches[0]["query"], "go");
    assert_eq!(
        searches[1]["url"],
        "/api/v1/search/results?lookfor=rust&type=AllFields"
    );

    let other = json_body(test.get("/api/v1/search/history", "s2").await).await;
    assert_eq!(other["searches"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn disabled_history_leaves_no_search_id() {
    let test = setup_with(SearchSettings {
        save_to_history: false,
        ..SearchSettings::default()
    })
    .await;
    seed_books(&test.pool).await;

    let body = json_body(test.get("/api/v1/search/results?lookfor=rust", "s1").await).await;
    assert!(body["search_id"].is_null());
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn record_page_shows_last_search_and_neighbours() {
    let test = setup().await;
    seed_books(&test.pool).await;

    test.get("/api/v1/search/results?lookfor=rust&sort=title", "s1")
        .await;

    let response = test.get("/api/v1/records/b2", "s1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["record"]["title"], "Rust in Action");
    assert_eq!(
        body["last_search"],
        "/api/v1/search/results?lookfor=rust&type=AllFields&sort=title"
    );
    assert_eq!(body["scroller"]["previous"], "b1");
    assert_eq!(body["scroller"]["next"], "b3");
    assert_eq!(body["scroller"]["position"], 2);

    // 다른 세션에는 기억된 검색이 없습니다.
    let body = json_body(test.get("/api/v1/records/b2", "s2").await).await;
    assert!(body["last_search"].is_null());
    assert!(body["scroller"].is_null());

    let response = test.get("/api/v1/records/nope", "s1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn advanced_edit_reports_restore_problems() {
    let test = setup().await;
    seed_books(&test.pool).await;

    let basic = json_body(test.get("/api/v1/search/results?lookfor=rust", "s1").await).await;
    let basic_id = basic["search_id"].as_str().unwrap().to_string();

    let advanced = json_body(
        test.get(
            "/api/v1/search/results?lookfor0=rust&type0=Title&lookfor1=2021&join=OR",
            "s1",
        )
        .await,
    )
    .await;
    let advanced_id = advanced["search_id"].as_str().unwrap().to_string();

    let body = json_body(
        test.get(&format!("/api/v1/search/advanced?edit={basic_id}"), "s1")
            .await,
    )
    .await;
    assert_eq!(body["error"], "advSearchError_notAdvanced");
    assert!(body["saved"].is_null());

    let body = json_body(
        test.get(&format!("/api/v1/search/advanced?edit={advanced_id}"), "s2")
            .await,
    )
    .await;
    assert_eq!(body["error"], "advSearchError_noRights");

    let body = json_body(test.get("/api/v1/search/advanced?edit=missing", "s1").await).await;
    assert_eq!(body["error"], "advSearchError_notFound");

    let body = json_body(
        test.get(&format!("/api/v1/search/advanced?edit={advanced_id}"), "s1")
            .await,
    )
    .await;
    assert!(body["error"].is_null());
    assert_eq!(body["saved"]["join"], "OR");
    assert_eq!(body["saved"]["terms"][0]["lookfor"], "rust");
    assert_eq!(body["options"]["advanced_supported"], true);
}

#[tokio::test]
async fn advanced_search_requires_backend_support() {
    let test = setup_with(SearchSettings {
        search_class_id: "Empty".to_string(),
        ..SearchSettings::default()
    })
    .await;

    let response = test.get("/api/v1/search/advanced", "s1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creating_records_requires_a_token() {
    let test = setup().await;

    let response = test
        .send(
            Request::post("/api/v1/records")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Dune"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = create_access_token("user-1", SECRET).unwrap();
    let response = test
        .send(
            Request::post("/api/v1/records")
                .header(CONTENT_TYPE, "application/json")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(
                    r#"{"id":"dune","title":"Dune","author":"Frank Herbert","publish_year":1965}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(test.get("/api/v1/search/results?lookfor=herbert", "s1").await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["id"], "dune");
}

#[tokio::test]
async fn register_then_login() {
    let test = setup().await;

    let response = test
        .send(
            Request::post("/api/v1/auth/register")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"reader","email":"reader@example.org","password":"correct horse"}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test
        .send(
            Request::post("/api/v1/auth/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"reader","password":"correct horse"}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = json_body(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test
        .send(
            Request::get("/api/v1/auth/me")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let body = json_body(response).await;
    assert_eq!(body["username"], "reader");
}

#[tokio::test]
async fn logging_in_keeps_searches_under_the_user() {
    let test = setup().await;
    seed_books(&test.pool).await;
    let token = create_access_token("user-1", SECRET).unwrap();

    // 같은 세션에서 먼저 익명으로 검색합니다.
    let anonymous = json_body(test.get("/api/v1/search/results?lookfor=go", "laptop").await).await;

    let response = test
        .send(
            Request::get("/api/v1/search/results?lookfor=go")
                .header(COOKIE, "katalog_sid=laptop")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let owned = json_body(response).await;
    let search_id = owned["search_id"].as_str().unwrap().to_string();
    assert_ne!(anonymous["search_id"], owned["search_id"]);

    let response = test
        .send(
            Request::get(format!("/api/v1/search/results?saved={search_id}"))
                .header(COOKIE, "katalog_sid=phone")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = test
        .send(
            Request::get("/api/v1/search/history")
                .header(COOKIE, "katalog_sid=phone")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let history = json_body(response).await;
    let searches = history["searches"].as_array().unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0]["id"], search_id.as_str());

    // 같은 사용자가 다른 세션에서 같은 검색을 하면 기존 행을 재사용합니다.
    let response = test
        .send(
            Request::get("/api/v1/search/results?lookfor=go")
                .header(COOKIE, "katalog_sid=phone")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(json_body(response).await["search_id"], search_id.as_str());
}

#[tokio::test]
async fn feedback_without_a_form_body_is_an_error_status() {
    let test = setup().await;

    for content_type in [None, Some("application/json"), Some("text/plain")] {
        let mut request = Request::post("/api/v1/ajax/feedback");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let response = test
            .send(request.body(Body::from("mood=1&message=x")).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{content_type:?}");
        let body = json_body(response).await;
        assert_eq!(body["status"], "ERROR");
        assert!(body["data"].is_null());
    }

    assert!(test.mailer.sent().is_empty());
}

#[tokio::test]
async fn broken_index_is_a_server_error_not_a_parse_error() {
    let test = setup().await;
    seed_books(&test.pool).await;
    sqlx::query("DROP TABLE records_fts")
        .execute(&test.pool)
        .await
        .unwrap();

    let response = test.get("/api/v1/search/results?lookfor=rust", "s1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "search_error");
}
