use crate::application::ports::session_repository::SessionRepository;
use crate::domain::ledger::User;

pub struct AuthenticateSession<'a, S: SessionRepository + ?Sized> {
    pub sessions: &'a S,
}

impl<'a, S: SessionRepository + ?Sized> AuthenticateSession<'a, S> {
    pub async fn execute(&self, token: &str) -> anyhow::Result<Option<User>> {
        self.sessions.find_user_by_token(token).await
    }
}
