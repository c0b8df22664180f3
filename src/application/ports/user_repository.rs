use async_trait::async_trait;

use crate::domain::ledger::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Resolve a GitHub login to the local user id, if the account is known.
    async fn find_by_github_id(&self, github_id: &str) -> anyhow::Result<Option<String>>;
    /// Provision a new user from a GitHub identity and return the local user id.
    async fn create_from_github(
        &self,
        github_id: &str,
        display_name: &str,
    ) -> anyhow::Result<String>;
    /// All users with their derived balances, most indebted first.
    async fn list_with_balances(&self) -> anyhow::Result<Vec<User>>;
    /// One user's balance in pence; zero for users with no transactions.
    async fn balance_of(&self, user_id: &str) -> anyhow::Result<i64>;
}
