use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub static_dir: String,
    /// URL prefix the app is mounted under, without a trailing slash.
    /// Empty when served from the root.
    pub web_root: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_oauth_state: String,
    pub github_required_org: String,
    pub session_ttl_days: i64,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8975".into());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://shaft.db?mode=rwc".into());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
        let web_root = env::var("WEB_ROOT")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_default();
        let github_client_id = require_env("GITHUB_CLIENT_ID")?;
        let github_client_secret = require_env("GITHUB_CLIENT_SECRET")?;
        let github_oauth_state = require_env("GITHUB_OAUTH_STATE")?;
        let github_required_org = require_env("GITHUB_REQUIRED_ORG")?;
        let session_ttl_days = env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(14);
        let is_production = matches!(
            env::var("RUST_ENV").ok().as_deref(),
            Some("production") | Some("prod")
        );

        if is_production && github_oauth_state.len() < 16 {
            anyhow::bail!("GITHUB_OAUTH_STATE must be a long random string in production");
        }

        Ok(Self {
            bind_addr,
            database_url,
            static_dir,
            web_root,
            github_client_id,
            github_client_secret,
            github_oauth_state,
            github_required_org,
            session_ttl_days,
            is_production,
        })
    }

    /// Session cookies are marked Secure when the app is reached over https.
    pub fn secure_cookies(&self) -> bool {
        self.web_root.starts_with("https://")
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl_days * 24 * 60 * 60
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set"))
}
