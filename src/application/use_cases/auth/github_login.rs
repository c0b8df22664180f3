use crate::application::ports::github_port::{GithubError, GithubPort};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;

/// Outcome of the OAuth callback exchange.
#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn { token: String },
    NotInOrg,
}

#[derive(thiserror::Error, Debug)]
pub enum GithubLoginError {
    #[error(transparent)]
    Github(#[from] GithubError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct CompleteGithubLogin<'a, U, S, G>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    G: GithubPort + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
    pub github: &'a G,
}

impl<'a, U, S, G> CompleteGithubLogin<'a, U, S, G>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    G: GithubPort + ?Sized,
{
    /// Exchange the callback code, provision the user on first sign-in
    /// (subject to the org gate) and mint a session token.
    pub async fn execute(
        &self,
        code: &str,
        required_org: &str,
    ) -> Result<LoginOutcome, GithubLoginError> {
        let access_token = self.github.exchange_oauth_code(code).await?;
        let gh_user = self.github.fetch_authenticated_user(&access_token).await?;

        let user_id = match self.users.find_by_github_id(&gh_user.login).await? {
            Some(user_id) => user_id,
            None => {
                if !self
                    .github
                    .is_active_member_of(&access_token, required_org)
                    .await?
                {
                    return Ok(LoginOutcome::NotInOrg);
                }
                let display_name = gh_user.name.as_deref().unwrap_or(&gh_user.login);
                self.users
                    .create_from_github(&gh_user.login, display_name)
                    .await?
            }
        };

        let token = self.sessions.create_token(&user_id).await?;
        Ok(LoginOutcome::LoggedIn { token })
    }
}
