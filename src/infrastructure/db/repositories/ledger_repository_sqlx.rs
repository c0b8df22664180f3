use async_trait::async_trait;
use chrono::DateTime;
use sqlx::Row;

use crate::application::ports::ledger_repository::{LedgerError, LedgerRepository};
use crate::domain::ledger::Transaction;
use crate::infrastructure::db::DbPool;

pub struct SqlxLedgerRepository {
    pub pool: DbPool,
}

impl SqlxLedgerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for SqlxLedgerRepository {
    async fn record(&self, txn: Transaction) -> Result<(), LedgerError> {
        let shaftee_exists = sqlx::query("SELECT user_id FROM users WHERE user_id = ?")
            .bind(&txn.shaftee)
            .fetch_optional(&self.pool)
            .await
            .map_err(anyhow::Error::from)?
            .is_some();
        if !shaftee_exists {
            return Err(LedgerError::UnknownUser {
                user_id: txn.shaftee,
            });
        }

        sqlx::query(
            "INSERT INTO transactions (shafter, shaftee, amount, time_sec, reason)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&txn.shafter)
        .bind(&txn.shaftee)
        .bind(txn.amount)
        .bind(txn.datetime.timestamp())
        .bind(&txn.reason)
        .execute(&self.pool)
        .await
        .map_err(anyhow::Error::from)?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT shafter, shaftee, amount, time_sec, reason
             FROM transactions
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut transactions = Vec::with_capacity(rows.len());
        for r in rows {
            let time_sec: i64 = r.get("time_sec");
            let datetime = DateTime::from_timestamp(time_sec, 0)
                .ok_or_else(|| anyhow::anyhow!("invalid timestamp in ledger: {time_sec}"))?;
            transactions.push(Transaction {
                shafter: r.get("shafter"),
                shaftee: r.get("shaftee"),
                amount: r.get("amount"),
                datetime,
                reason: r.get("reason"),
            });
        }
        Ok(transactions)
    }
}
