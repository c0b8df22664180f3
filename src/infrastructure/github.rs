use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header;
use serde::Deserialize;

use crate::application::ports::github_port::{GithubError, GithubPort, GithubUser};

const OAUTH_BASE: &str = "https://github.com";
const API_BASE: &str = "https://api.github.com";

/// The GitHub API requires a User-Agent on every request.
const USER_AGENT: &str = concat!("shaft/", env!("CARGO_PKG_VERSION"));

pub struct ReqwestGithubClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    oauth_base: String,
    api_base: String,
}

impl ReqwestGithubClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_base_urls(client_id, client_secret, OAUTH_BASE, API_BASE)
    }

    /// Base URLs are injectable so tests can point the client at a fake.
    pub fn with_base_urls(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        oauth_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            oauth_base: oauth_base.into(),
            api_base: api_base.into(),
        }
    }

    fn api_get(&self, path: &str, access_token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.api_base, path))
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::AUTHORIZATION, format!("token {access_token}"))
    }
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserResponse {
    login: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct OrgMembershipResponse {
    state: String,
}

#[async_trait]
impl GithubPort for ReqwestGithubClient {
    async fn exchange_oauth_code(&self, code: &str) -> Result<String, GithubError> {
        let resp = self
            .client
            .post(format!("{}/login/oauth/access_token", self.oauth_base))
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(GithubError::Transport)?;
        let resp = check_status(resp)?;
        let body: AccessTokenResponse = resp.json().await.map_err(GithubError::Decode)?;
        Ok(body.access_token)
    }

    async fn fetch_authenticated_user(
        &self,
        access_token: &str,
    ) -> Result<GithubUser, GithubError> {
        let resp = self
            .api_get("/user", access_token)
            .send()
            .await
            .map_err(GithubError::Transport)?;
        let resp = check_status(resp)?;
        let body: UserResponse = resp.json().await.map_err(GithubError::Decode)?;
        Ok(GithubUser {
            login: body.login,
            name: body.name,
        })
    }

    async fn is_active_member_of(
        &self,
        access_token: &str,
        org: &str,
    ) -> Result<bool, GithubError> {
        let resp = self
            .api_get(&format!("/user/memberships/orgs/{org}"), access_token)
            .send()
            .await
            .map_err(GithubError::Transport)?;
        // GitHub answers 404 for non-members and 403 when the token cannot
        // see the org at all; neither admits the user.
        if resp.status() == StatusCode::FORBIDDEN || resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let resp = check_status(resp)?;
        let body: OrgMembershipResponse = resp.json().await.map_err(GithubError::Decode)?;
        Ok(body.state == "active")
    }
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GithubError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(GithubError::Status(resp.status()))
    }
}
