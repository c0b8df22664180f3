use axum::{
    Router,
    extract::{FromRequestParts, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info};

use crate::application::use_cases::auth::authenticate::AuthenticateSession;
use crate::application::use_cases::auth::github_login::{
    CompleteGithubLogin, GithubLoginError, LoginOutcome,
};
use crate::application::use_cases::auth::logout::Logout;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::found;

/// Name of the session cookie.
const TOKEN_COOKIE: &str = "token";

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/github/login", get(github_login))
        .route("/github/callback", get(github_callback))
        .route("/logout", post(logout))
        .with_state(ctx)
}

/// Starts the OAuth flow by bouncing the browser to GitHub.
async fn github_login(State(ctx): State<AppContext>) -> Response {
    let authorize_url = format!(
        "https://github.com/login/oauth/authorize?client_id={}&state={}&scope=read:org",
        urlencoding::encode(&ctx.cfg.github_client_id),
        urlencoding::encode(&ctx.cfg.github_oauth_state),
    );
    found(&authorize_url)
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: String,
    state: String,
}

/// Handles the redirect back from GitHub: verifies the state parameter,
/// completes the login and plants the session cookie.
async fn github_callback(
    State(ctx): State<AppContext>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, StatusCode> {
    if params.state != ctx.cfg.github_oauth_state {
        return Ok((StatusCode::BAD_REQUEST, "state parameter mismatch").into_response());
    }

    let users = ctx.users();
    let sessions = ctx.sessions();
    let github = ctx.github();
    let uc = CompleteGithubLogin {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        github: github.as_ref(),
    };

    let outcome = uc
        .execute(&params.code, &ctx.cfg.github_required_org)
        .await
        .map_err(|err| {
            error!(error = ?err, "github_login_failed");
            match err {
                GithubLoginError::Github(_) => StatusCode::SERVICE_UNAVAILABLE,
                GithubLoginError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        })?;

    match outcome {
        LoginOutcome::NotInOrg => Ok((
            StatusCode::FORBIDDEN,
            "account is not a member of the required organization",
        )
            .into_response()),
        LoginOutcome::LoggedIn { token } => {
            info!("user_logged_in");
            let cookie = build_session_cookie(
                &token,
                ctx.cfg.session_ttl_secs(),
                ctx.cfg.secure_cookies(),
            );
            let value =
                HeaderValue::from_str(&cookie).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
            let mut headers = HeaderMap::new();
            headers.insert(header::SET_COOKIE, value);
            Ok((headers, found(&format!("{}/", ctx.cfg.web_root))).into_response())
        }
    }
}

/// Drops the server-side session and expires the cookie.
async fn logout(State(ctx): State<AppContext>, token: Option<SessionToken>) -> Response {
    if let Some(SessionToken(token)) = token {
        let sessions = ctx.sessions();
        let uc = Logout {
            sessions: sessions.as_ref(),
        };
        if let Err(err) = uc.execute(&token).await {
            error!(error = ?err, "logout_failed");
        } else {
            info!("user_logged_out");
        }
    }

    let cookie = build_session_cookie("", 0, ctx.cfg.secure_cookies());
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).unwrap_or(HeaderValue::from_static("token=; Max-Age=0")),
    );
    (headers, found(".")).into_response()
}

// --- Session extractors ---

/// The raw session token from the Authorization header or the token cookie.
pub struct SessionToken(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(SessionToken(t.to_string()));
            }
        }

        if let Some(cookie_hdr) = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = get_cookie(cookie_hdr, TOKEN_COOKIE) {
                return Ok(SessionToken(token));
            }
        }

        Err(StatusCode::UNAUTHORIZED)
    }
}

/// A resolved session. Using this as an extractor makes the endpoint require
/// a valid login; anything else is bounced to the login page.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub display_name: String,
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let login_url = format!("{}/login", ctx.cfg.web_root);
        let SessionToken(token) = SessionToken::from_request_parts(parts, ctx)
            .await
            .map_err(|_| found(&login_url))?;

        let sessions = ctx.sessions();
        let uc = AuthenticateSession {
            sessions: sessions.as_ref(),
        };
        match uc.execute(&token).await {
            Ok(Some(user)) => Ok(AuthenticatedUser {
                user_id: user.user_id,
                display_name: user.display_name,
            }),
            Ok(None) => Err(found(&login_url)),
            Err(err) => {
                error!(error = ?err, "session_lookup_failed");
                Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
            }
        }
    }
}

// --- Cookie helpers ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        TOKEN_COOKIE,
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}
