use crate::application::ports::user_repository::UserRepository;
use crate::domain::ledger::User;

pub struct ListBalances<'a, U: UserRepository + ?Sized> {
    pub users: &'a U,
}

impl<'a, U: UserRepository + ?Sized> ListBalances<'a, U> {
    /// All users with balances, most indebted first.
    pub async fn execute(&self) -> anyhow::Result<Vec<User>> {
        self.users.list_with_balances().await
    }
}
