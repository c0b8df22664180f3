use crate::application::ports::ledger_repository::LedgerRepository;
use crate::domain::ledger::Transaction;

/// How many transactions the pages and the API show.
pub const RECENT_LIMIT: u32 = 20;

pub struct ListTransactions<'a, L: LedgerRepository + ?Sized> {
    pub ledger: &'a L,
}

impl<'a, L: LedgerRepository + ?Sized> ListTransactions<'a, L> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Transaction>> {
        self.ledger.recent(RECENT_LIMIT).await
    }
}
