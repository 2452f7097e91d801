//! 게이트웨이 통합 테스트
//!
//! 실제 리스너에 콘솔을 띄우고 업스트림은 httpmock으로 대체합니다.
//! 리다이렉트를 따라가면 가드 동작을 검증할 수 없으므로 클라이언트는
//! redirect를 끈 상태로 호출합니다.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::{json, Value};

use ops_console::{create_router, AppState, Config};

const VALID_COOKIE: &str = "adminToken=valid";
const CLEAR_COOKIE: &str = "adminToken=; Path=/; Max-Age=0";

fn console_config(api_url: &str) -> Config {
    Config {
        port: 0,
        api_url: api_url.trim_end_matches('/').to_string(),
        upstream_timeout_secs: 1,
        purchases_page_limit: 50,
        purchases_hard_cap: 5000,
    }
}

async fn spawn_console(config: Config) -> (String, reqwest::Client) {
    let state = Arc::new(AppState::new(config).expect("http client"));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("test client");

    (base, client)
}

/// `adminToken=valid` 쿠키만 통과시키는 identity 엔드포인트
async fn mock_me(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/admin-users/me")
                .header("cookie", VALID_COOKIE);
            then.status(200).json_body(json!({
                "admin": {
                    "id": "adm_1",
                    "name": "Kim",
                    "email": "kim@example.com",
                    "role": "admin",
                    "isActive": true
                }
            }));
        })
        .await
}

fn set_cookie_values(resp: &reqwest::Response) -> Vec<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_protected_route_redirects_and_clears_cookie() {
    let server = MockServer::start_async().await;
    // /me 미등록: 업스트림 404 == 미인증
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/dashboard", base))
        .header("cookie", "adminToken=stale")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");
    assert!(set_cookie_values(&resp).iter().any(|c| c == CLEAR_COOKIE));
}

#[tokio::test]
async fn test_protected_route_passes_with_valid_session() {
    let server = MockServer::start_async().await;
    let me = mock_me(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/admin/dashboard");
            then.status(200).json_body(json!({ "totalUsers": 7 }));
        })
        .await;

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/dashboard", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["admin"]["name"], "Kim");
    assert_eq!(body["dashboard"]["totalUsers"], 7);
    assert_eq!(me.hits_async().await, 1);
}

#[tokio::test]
async fn test_login_page_bounces_authenticated_user() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/dashboard");
}

#[tokio::test]
async fn test_login_page_renders_for_anonymous() {
    let server = MockServer::start_async().await;
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client.get(format!("{}/", base)).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains("/auth/login"));
}

#[tokio::test]
async fn test_whoami_never_redirects() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    // 미인증: null, 리다이렉트 없음
    let resp = client.get(format!("{}/whoami", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["admin"], Value::Null);

    // 인증: identity 그대로
    let resp = client
        .get(format!("{}/whoami", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["admin"]["name"], "Kim");
    assert_eq!(body["admin"]["role"], "admin");
}

#[tokio::test]
async fn test_memberships_aggregates_all_pages_in_order() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;

    let mut page_mocks = Vec::new();
    for page in 1u64..=3 {
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/all/purchases")
                    .query_param("page", page.to_string());
                let items: Vec<Value> = (0..50)
                    .map(|i| json!({ "id": (page - 1) * 50 + i }))
                    .collect();
                then.status(200).json_body(json!({
                    "items": items,
                    "page": page,
                    "pages": 3,
                    "total": 150
                }));
            })
            .await;
        page_mocks.push(m);
    }

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/memberships", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 150);
    assert_eq!(items[0]["id"], 0);
    assert_eq!(items[149]["id"], 149);
    assert_eq!(body["total"], 150);

    for m in &page_mocks {
        assert_eq!(m.hits_async().await, 1);
    }
}

#[tokio::test]
async fn test_memberships_stops_at_hard_cap() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;

    // 10페이지를 선언하지만 캡(120)이 3페이지째에 찬다
    let mut page_mocks = Vec::new();
    for page in 1u64..=4 {
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/all/purchases")
                    .query_param("page", page.to_string());
                let items: Vec<Value> = (0..50)
                    .map(|i| json!({ "id": (page - 1) * 50 + i }))
                    .collect();
                then.status(200).json_body(json!({
                    "items": items,
                    "page": page,
                    "pages": 10,
                    "total": 500
                }));
            })
            .await;
        page_mocks.push(m);
    }

    let mut config = console_config(&server.base_url());
    config.purchases_hard_cap = 120;
    let (base, client) = spawn_console(config).await;

    let resp = client
        .get(format!("{}/memberships", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 120);
    assert_eq!(items[119]["id"], 119);

    // 1~3페이지까지만 요청하고 멈춘다
    assert_eq!(page_mocks[0].hits_async().await, 1);
    assert_eq!(page_mocks[1].hits_async().await, 1);
    assert_eq!(page_mocks[2].hits_async().await, 1);
    assert_eq!(page_mocks[3].hits_async().await, 0);
}

#[tokio::test]
async fn test_memberships_missing_items_fails_without_partial_data() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/all/purchases")
                .query_param("page", "1");
            // items 배열이 없는 깨진 응답
            then.status(200)
                .json_body(json!({ "page": 1, "pages": 2, "total": 100 }));
        })
        .await;
    let page_two = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/all/purchases")
                .query_param("page", "2");
            then.status(200)
                .json_body(json!({ "items": [], "page": 2, "pages": 2, "total": 100 }));
        })
        .await;

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/memberships", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 0);
    assert!(!body["message"].as_str().unwrap().is_empty());
    // 부분 수집 없이 즉시 실패
    assert_eq!(page_two.hits_async().await, 0);
}

#[tokio::test]
async fn test_upstream_timeout_becomes_json_error() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/admin/dashboard");
            then.status(200)
                .json_body(json!({ "totalUsers": 1 }))
                .delay(Duration::from_millis(1500));
        })
        .await;

    // 클라이언트 타임아웃 1초 < 업스트림 지연 1.5초
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/dashboard", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
    assert!(!body["error"]["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_clears_cookie_even_when_upstream_down() {
    let server = MockServer::start_async().await;
    // 로그아웃 엔드포인트 미등록: 업스트림 실패
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .post(format!("{}/auth/logout", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");
    assert!(set_cookie_values(&resp).iter().any(|c| c == CLEAR_COOKIE));
}

#[tokio::test]
async fn test_login_relays_all_set_cookie_values() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/admin-users/login")
                .json_body(json!({ "email": "kim@example.com", "password": "secret" }));
            then.status(200)
                .header("set-cookie", "adminToken=tok123; Path=/; HttpOnly")
                .header("set-cookie", "csrf=abc; Path=/")
                .json_body(json!({ "admin": { "id": "adm_1", "name": "Kim" } }));
        })
        .await;

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .post(format!("{}/auth/login", base))
        .json(&json!({ "email": "kim@example.com", "password": "secret" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let cookies = set_cookie_values(&resp);
    assert!(cookies.iter().any(|c| c == "adminToken=tok123; Path=/; HttpOnly"));
    assert!(cookies.iter().any(|c| c == "csrf=abc; Path=/"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["admin"]["name"], "Kim");
}

#[tokio::test]
async fn test_login_failure_status_passthrough() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/admin-users/login");
            then.status(401).json_body(json!({ "message": "invalid credentials" }));
        })
        .await;

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .post(format!("{}/auth/login", base))
        .json(&json!({ "email": "kim@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "invalid credentials");
}

#[tokio::test]
async fn test_proxy_forwards_only_cookie_and_origin() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;
    let dashboard = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/admin/dashboard")
                .header("cookie", VALID_COOKIE)
                .header("origin", "https://console.example")
                .matches(|req| {
                    // 다른 클라이언트 헤더는 업스트림으로 새지 않는다
                    req.headers.as_ref().is_some_and(|headers| {
                        !headers
                            .iter()
                            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
                    })
                });
            then.status(200).json_body(json!({}));
        })
        .await;

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/dashboard", base))
        .header("cookie", VALID_COOKIE)
        .header("origin", "https://console.example")
        .header("authorization", "Bearer should-not-leak")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(dashboard.hits_async().await, 1);
}

#[tokio::test]
async fn test_grid_endpoint_error_keeps_items_array() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/coupons");
            then.status(503).json_body(json!({ "message": "maintenance" }));
        })
        .await;

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/coupons/data", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["message"], "maintenance");
}

#[tokio::test]
async fn test_admins_data_total_falls_back_to_item_count() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/admin-users/admins");
            then.status(200).json_body(json!({
                "items": [{ "id": "adm_1" }, { "id": "adm_2" }],
                "page": 1,
                "pages": 1,
                "total": 0
            }));
        })
        .await;

    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/admins/data", base))
        .header("cookie", VALID_COOKIE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_toggle_status_rejects_non_boolean() {
    let server = MockServer::start_async().await;
    mock_me(&server).await;
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .post(format!("{}/admin/adm_2/status", base))
        .header("cookie", VALID_COOKIE)
        .json(&json!({ "isActive": "yes" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "isActive must be boolean.");
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let server = MockServer::start_async().await;
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client.get(format!("{}/health", base)).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = MockServer::start_async().await;
    let (base, client) = spawn_console(console_config(&server.base_url())).await;

    let resp = client
        .get(format!("{}/no-such-route", base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
