use async_trait::async_trait;

use crate::domain::ledger::User;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Mint a fresh opaque session token for the user.
    async fn create_token(&self, user_id: &str) -> anyhow::Result<String>;
    /// Resolve a token to its user, including the current balance.
    async fn find_user_by_token(&self, token: &str) -> anyhow::Result<Option<User>>;
    /// Remove a token. Removing an unknown token is not an error.
    async fn delete_token(&self, token: &str) -> anyhow::Result<()>;
}
