//! HTTP integration tests: the real router over an in-memory SQLite pool,
//! with the GitHub port stubbed at the trait seam.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use shaft::application::ports::github_port::{GithubError, GithubPort, GithubUser};
use shaft::application::ports::session_repository::SessionRepository;
use shaft::application::ports::user_repository::UserRepository;
use shaft::bootstrap::app_context::{AppContext, AppServices};
use shaft::bootstrap::config::Config;
use shaft::infrastructure::db::DbPool;
use shaft::infrastructure::db::repositories::ledger_repository_sqlx::SqlxLedgerRepository;
use shaft::infrastructure::db::repositories::session_repository_sqlx::SqlxSessionRepository;
use shaft::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
use shaft::presentation::http::build_app;

const FAKE_CODE: &str = "1234";
const FAKE_STATE: &str = "fake_state";
const FAKE_ORG: &str = "fake-org";

#[derive(Clone)]
struct StubGithub {
    login: String,
    name: Option<String>,
    in_org: bool,
}

impl StubGithub {
    fn member(login: &str, name: Option<&str>) -> Self {
        Self {
            login: login.to_owned(),
            name: name.map(str::to_owned),
            in_org: true,
        }
    }

    fn outsider(login: &str) -> Self {
        Self {
            login: login.to_owned(),
            name: None,
            in_org: false,
        }
    }
}

#[async_trait]
impl GithubPort for StubGithub {
    async fn exchange_oauth_code(&self, code: &str) -> Result<String, GithubError> {
        assert_eq!(code, FAKE_CODE);
        Ok("fake_access_token".to_owned())
    }

    async fn fetch_authenticated_user(
        &self,
        access_token: &str,
    ) -> Result<GithubUser, GithubError> {
        assert_eq!(access_token, "fake_access_token");
        Ok(GithubUser {
            login: self.login.clone(),
            name: self.name.clone(),
        })
    }

    async fn is_active_member_of(
        &self,
        _access_token: &str,
        org: &str,
    ) -> Result<bool, GithubError> {
        assert_eq!(org, FAKE_ORG);
        Ok(self.in_org)
    }
}

fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        static_dir: "./static".into(),
        web_root: String::new(),
        github_client_id: "fake_client_id".into(),
        github_client_secret: "fake_client_secret".into(),
        github_oauth_state: FAKE_STATE.into(),
        github_required_org: FAKE_ORG.into(),
        session_ttl_days: 14,
        is_production: false,
    }
}

async fn setup_app(github: StubGithub) -> (Router, DbPool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let services = AppServices::new(
        Arc::new(SqlxUserRepository::new(pool.clone())),
        Arc::new(SqlxSessionRepository::new(pool.clone())),
        Arc::new(SqlxLedgerRepository::new(pool.clone())),
        Arc::new(github),
    );
    let ctx = AppContext::new(test_config(), services);
    (build_app(ctx, pool.clone()), pool)
}

/// Provision a user directly and mint a session token for them.
async fn seed_session(pool: &DbPool, login: &str, name: &str) -> String {
    SqlxUserRepository::new(pool.clone())
        .create_from_github(login, name)
        .await
        .expect("create user");
    SqlxSessionRepository::new(pool.clone())
        .create_token(login)
        .await
        .expect("create token")
}

async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request")
}

async fn get(app: &Router, path: &str) -> axum::response::Response {
    send(
        app,
        Request::builder().uri(path).body(Body::empty()).unwrap(),
    )
    .await
}

async fn get_authed(app: &Router, path: &str, token: &str) -> axum::response::Response {
    send(
        app,
        Request::builder()
            .uri(path)
            .header(header::COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn post_json(
    app: &Router,
    path: &str,
    token: &str,
    body: Value,
) -> axum::response::Response {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::COOKIE, format!("token={token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

fn location(resp: &axum::response::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = setup_app(StubGithub::member("alice", None)).await;
    let resp = get(&app, "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn root_redirects_anonymous_to_login() {
    let (app, _) = setup_app(StubGithub::member("alice", None)).await;
    let resp = get(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "login");
}

#[tokio::test]
async fn root_redirects_sessions_to_home() {
    let (app, pool) = setup_app(StubGithub::member("alice", None)).await;
    let token = seed_session(&pool, "alice", "Alice").await;
    let resp = get_authed(&app, "/", &token).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "home");
}

#[tokio::test]
async fn github_login_redirects_to_github() {
    let (app, _) = setup_app(StubGithub::member("alice", None)).await;
    let resp = get(&app, "/github/login").await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = location(&resp);
    let (base, query) = location.split_once('?').expect("query string");
    assert_eq!(base, "https://github.com/login/oauth/authorize");

    let params: BTreeMap<&str, &str> = query
        .split('&')
        .map(|kv| kv.split_once('=').unwrap())
        .collect();
    assert_eq!(
        params,
        BTreeMap::from([
            ("client_id", "fake_client_id"),
            ("state", FAKE_STATE),
            ("scope", "read:org"),
        ])
    );
}

#[tokio::test]
async fn callback_rejects_state_mismatch() {
    let (app, _) = setup_app(StubGithub::member("alice", None)).await;
    let resp = get(&app, "/github/callback?code=1234&state=wrong").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn callback_refuses_accounts_outside_the_org() {
    let (app, _) = setup_app(StubGithub::outsider("mallory")).await;
    let resp = get(&app, "/github/callback?code=1234&state=fake_state").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn callback_provisions_member_and_sets_session_cookie() {
    let (app, _) = setup_app(StubGithub::member("fake_login", Some("Fake Name"))).await;

    let resp = get(&app, "/github/callback?code=1234&state=fake_state").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));

    let token = cookie
        .split(';')
        .next()
        .and_then(|kv| kv.strip_prefix("token="))
        .expect("token value")
        .to_owned();
    assert!(token.len() > 10, "token too short: {token}");

    // The cookie authenticates the API, and the new user starts at zero.
    let resp = get_authed(&app, "/api/balances", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let balances = body_json(resp).await;
    assert_eq!(balances["fake_login"]["display_name"], "Fake Name");
    assert_eq!(balances["fake_login"]["balance"], 0);
}

#[tokio::test]
async fn returning_users_skip_the_org_gate() {
    // The stub denies membership, but the account already exists locally.
    let (app, pool) = setup_app(StubGithub::outsider("alice")).await;
    SqlxUserRepository::new(pool.clone())
        .create_from_github("alice", "Alice")
        .await
        .unwrap();

    let resp = get(&app, "/github/callback?code=1234&state=fake_state").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn api_requires_a_session() {
    let (app, _) = setup_app(StubGithub::member("alice", None)).await;
    let resp = get(&app, "/api/balances").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn bearer_token_works_in_place_of_the_cookie() {
    let (app, pool) = setup_app(StubGithub::member("alice", None)).await;
    let token = seed_session(&pool, "alice", "Alice").await;

    let resp = send(
        &app,
        Request::builder()
            .uri("/api/balances")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn shaft_round_trip_through_the_api() {
    let (app, pool) = setup_app(StubGithub::member("alice", None)).await;
    let token = seed_session(&pool, "alice", "Alice").await;
    SqlxUserRepository::new(pool.clone())
        .create_from_github("bob", "Bob")
        .await
        .unwrap();

    let resp = post_json(
        &app,
        "/api/shaft",
        &token,
        serde_json::json!({"other_user": "bob", "amount": 250, "reason": "pizza"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!({}));

    let resp = get_authed(&app, "/api/transactions", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let transactions = body_json(resp).await;
    let list = transactions.as_array().expect("array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["shafter"], "alice");
    assert_eq!(list[0]["shaftee"], "bob");
    assert_eq!(list[0]["amount"], 250);
    assert_eq!(list[0]["reason"], "pizza");

    let resp = get_authed(&app, "/api/balances", &token).await;
    let balances = body_json(resp).await;
    assert_eq!(balances["alice"]["balance"], 250);
    assert_eq!(balances["bob"]["balance"], -250);
}

#[tokio::test]
async fn shafting_an_unknown_user_is_a_client_error() {
    let (app, pool) = setup_app(StubGithub::member("alice", None)).await;
    let token = seed_session(&pool, "alice", "Alice").await;

    let resp = post_json(
        &app,
        "/api/shaft",
        &token,
        serde_json::json!({"other_user": "nobody", "amount": 100, "reason": "ghost"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("nobody"));
}

#[tokio::test]
async fn home_page_shows_balances_and_preserves_the_reason() {
    let (app, pool) = setup_app(StubGithub::member("alice", None)).await;
    let token = seed_session(&pool, "alice", "Alice").await;
    SqlxUserRepository::new(pool.clone())
        .create_from_github("bob", "Bob")
        .await
        .unwrap();

    let resp = get_authed(&app, "/home", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Alice"));
    assert!(html.contains("Bob"));

    let resp = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/shaft")
            .header(header::COOKIE, format!("token={token}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("other_user=bob&amount=250&reason=beer"))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("value=\"beer\""));
    assert!(html.contains("£ 2.50"));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (app, pool) = setup_app(StubGithub::member("alice", None)).await;
    let token = seed_session(&pool, "alice", "Alice").await;

    let resp = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), ".");
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));

    // The old token no longer authenticates anything.
    let resp = get_authed(&app, "/api/balances", &token).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
}
