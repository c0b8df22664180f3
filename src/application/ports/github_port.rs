use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct GithubUser {
    pub login: String,
    pub name: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum GithubError {
    #[error("github request failed")]
    Transport(#[source] reqwest::Error),
    #[error("github returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to decode github response")]
    Decode(#[source] reqwest::Error),
}

#[async_trait]
pub trait GithubPort: Send + Sync {
    /// Exchange an OAuth callback code for a user access token.
    async fn exchange_oauth_code(&self, code: &str) -> Result<String, GithubError>;
    /// The GitHub account behind an access token.
    async fn fetch_authenticated_user(&self, access_token: &str) -> Result<GithubUser, GithubError>;
    /// Whether the token's account is an active member of the org.
    async fn is_active_member_of(&self, access_token: &str, org: &str)
    -> Result<bool, GithubError>;
}
