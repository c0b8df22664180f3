use async_trait::async_trait;

use crate::domain::ledger::Transaction;

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("unknown user: {user_id}")]
    UnknownUser { user_id: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Commit a transaction. The shaftee must already exist.
    async fn record(&self, txn: Transaction) -> Result<(), LedgerError>;
    /// The most recent transactions, newest first.
    async fn recent(&self, limit: u32) -> anyhow::Result<Vec<Transaction>>;
}
