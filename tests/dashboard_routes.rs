/// Router tests: the served dashboard page against a mocked scoring API
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use lead_scoring_dashboard::config::Config;
use lead_scoring_dashboard::handlers::{router, AppState, SESSION_COOKIE};
use lead_scoring_dashboard::scoring_client::ScoringApiClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_state(base_url: String) -> Arc<AppState> {
    let config = Config {
        port: 3000,
        scoring_api_base_url: base_url,
        request_timeout_secs: Some(5),
        session_idle_secs: 60,
    };
    let client =
        ScoringApiClient::new(&config.scoring_api_base_url, config.request_timeout()).unwrap();
    Arc::new(AppState::new(&config, client))
}

/// `name=value` part of the session `Set-Cookie` header.
fn issued_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .filter(|pair| pair.starts_with(SESSION_COOKIE))
        .map(str::to_string)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = router(create_state("http://127.0.0.1:1".to_string()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_page_load_fetches_and_renders() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Email": "low@example.com", "InitialScore": 30, "RerankedScore": 15, "Comments": "just browsing"},
            {"Email": "high@example.com", "InitialScore": 70, "RerankedScore": 95, "Comments": "urgent"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = router(create_state(mock_server.uri()));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    let high = html.find("high@example.com").unwrap();
    let low = html.find("low@example.com").unwrap();
    assert!(high < low);
    assert!(html.contains(r#"id="no-leads-message" style="display: none;""#));
    assert!(!html.contains(r#"role="alert""#));
}

#[tokio::test]
async fn test_page_load_failure_shows_alert() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/leads"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let app = router(create_state(mock_server.uri()));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains(r#"role="alert">Could not fetch leads from the server.</div>"#));
}

#[tokio::test]
async fn test_rejected_form_post_keeps_values_and_alerts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/score"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "Invalid email"})))
        .mount(&mock_server)
        .await;

    let app = router(create_state(mock_server.uri()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/leads")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "Email=not-an-email&CreditScore=700&AgeGroup=26-35&Income=50000&TimeOnPage=60&PagesVisited=3",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Failed to score lead: Invalid email"));
    assert!(html.contains(r#"name="Email" value="not-an-email""#));
    assert!(html.contains(r#"<option value="26-35" selected>"#));
    assert!(!html.contains("disabled"));
}

#[tokio::test]
async fn test_accepted_form_post_clears_form() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/score"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Email": "jane@example.com", "InitialScore": 80, "RerankedScore": 100, "Comments": "ready to buy"}
        ])))
        .mount(&mock_server)
        .await;

    let app = router(create_state(mock_server.uri()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/leads")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "Email=jane%40example.com&CreditScore=720&Income=700000&TimeOnPage=200&PagesVisited=10&Comments=ready+to+buy",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("<td>jane@example.com</td>"));
    assert!(html.contains(r#"name="Email" value="""#));
    assert!(!html.contains(r#"role="alert""#));
}

#[tokio::test]
async fn test_refresh_rerenders() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = router(create_state(mock_server.uri()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains(r#"<tbody id="leads-table-body"></tbody>"#));
    assert!(html.contains(r#"id="no-leads-message" style="display: block;""#));
}

#[tokio::test]
async fn test_concurrent_visitors_get_separate_pages() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/score"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(600)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = router(create_state(mock_server.uri()));
    let visitor_a = app.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/leads")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "Email=alice%40secret.com&CreditScore=700&Income=50000&TimeOnPage=60&PagesVisited=3",
            ))
            .unwrap(),
    );
    let visitor_b = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        app.clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
    };

    let (a, b) = tokio::join!(visitor_a, visitor_b);
    let (a, b) = (a.unwrap(), b.unwrap());

    let cookie_a = issued_cookie(&a).expect("session issued to A");
    let cookie_b = issued_cookie(&b).expect("session issued to B");
    assert_ne!(cookie_a, cookie_b);

    let html_b = body_text(b).await;
    assert!(!html_b.contains("alice@secret.com"));
    assert!(!html_b.contains("disabled"));
}

#[tokio::test]
async fn test_session_keeps_form_values_and_alerts_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/score"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "Invalid email"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = router(create_state(mock_server.uri()));
    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/leads")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("Email=bob%40example.com&CreditScore=abc"))
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = issued_cookie(&first).expect("session issued");
    assert!(body_text(first).await.contains("Failed to score lead: Invalid email"));

    let second = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(issued_cookie(&second).is_none());
    let html = body_text(second).await;
    assert!(html.contains(r#"name="Email" value="bob@example.com""#));
    assert!(!html.contains(r#"role="alert""#));

    let stranger = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(!body_text(stranger).await.contains("bob@example.com"));
}
