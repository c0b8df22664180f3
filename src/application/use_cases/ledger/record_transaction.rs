use crate::application::ports::ledger_repository::{LedgerError, LedgerRepository};
use crate::domain::ledger::Transaction;

pub struct RecordTransaction<'a, L: LedgerRepository + ?Sized> {
    pub ledger: &'a L,
}

impl<'a, L: LedgerRepository + ?Sized> RecordTransaction<'a, L> {
    pub async fn execute(
        &self,
        shafter: &str,
        shaftee: &str,
        amount: i64,
        reason: &str,
    ) -> Result<(), LedgerError> {
        self.ledger
            .record(Transaction {
                shafter: shafter.to_owned(),
                shaftee: shaftee.to_owned(),
                amount,
                datetime: chrono::Utc::now(),
                reason: reason.to_owned(),
            })
            .await
    }
}
