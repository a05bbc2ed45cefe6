//! HttpBackend against a wiremock server.

use std::time::Duration;

use course_dash::AppError;
use course_dash::api::{Backend, ConfigUpdate, CoursePatch, HttpBackend, RangeUpdate};
use course_dash::models::{CourseStatus, Credentials, RegisterState};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&server.uri(), Some(Duration::from_secs(5))).expect("client")
}

#[tokio::test]
async fn fetches_roster() {
    let server = MockServer::start().await;
    let body = r#"[
        {"uid":"51234","abbr":"C S 439","title":"Computer Architecture","prof":"PATT",
         "status":"open","register":"register","paused":false},
        {"uid":"99999","abbr":null,"title":null,"prof":null,
         "status":"invalid","register":null,"paused":false}
    ]"#;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let courses = backend(&server).fetch_courses().await.unwrap();

    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].status, CourseStatus::Open);
    assert_eq!(courses[0].register, RegisterState::Armed);
    assert_eq!(courses[1].status, CourseStatus::Invalid);
    assert!(!courses[1].actions_enabled());
}

#[tokio::test]
async fn course_patch_goes_in_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/courses/51234"))
        .and(query_param("pause", "true"))
        .respond_with(ResponseTemplate::new(201).set_body_raw(
            r#"{"uid":"51234","status":"closed","register":null,"paused":true}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let course = backend(&server)
        .post_course("51234", &CoursePatch::pause(true))
        .await
        .unwrap();

    assert!(course.paused);
    assert_eq!(course.status, CourseStatus::Closed);
}

#[tokio::test]
async fn cleared_range_posts_none_for_both_bounds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/config"))
        .and(query_param("start", "none"))
        .and(query_param("end", "none"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"sid":"20219","interval":"180","start":null,"end":null}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let update = ConfigUpdate { interval: None, range: Some(RangeUpdate::Clear) };
    let payload = backend(&server).post_config(&update).await.unwrap();
    let (config, sid) = payload.into_config().unwrap();

    assert_eq!(config.time_range, None);
    assert_eq!(sid.as_deref(), Some("20219"));
}

#[tokio::test]
async fn login_sends_form_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("id=abc123"))
        .and(body_string_contains("password=p%40ss+word"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"user":true,"browser":false}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials {
        id: "abc123".to_string(),
        password: "p@ss word".to_string(),
        remember: true,
    };
    let payload = backend(&server).login(&credentials).await.unwrap();

    assert_eq!(payload.user, Some(true));
    assert_eq!(payload.browser, Some(false));
}

#[tokio::test]
async fn rejected_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/courses/11111"))
        .respond_with(ResponseTemplate::new(404).set_body_string("course id 11111 not valid or not found"))
        .mount(&server)
        .await;

    let result = backend(&server).delete_course("11111").await;

    match result {
        Err(AppError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/login_status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = backend(&server).session_status().await;
    assert!(matches!(result, Err(AppError::Decode(_))));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let backend = HttpBackend::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();

    let result = backend.fetch_config().await;

    assert!(result.as_ref().is_err_and(|e| e.is_transport()), "{:?}", result.err());
}

#[test]
fn bad_base_url_is_a_config_error() {
    let result = HttpBackend::new("not a url", None);
    assert!(matches!(result, Err(AppError::Config(_))));
}
