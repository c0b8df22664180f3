use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use sqlx::Row;

use crate::application::ports::session_repository::SessionRepository;
use crate::domain::ledger::User;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::repositories::BALANCE_ENTRIES;

const TOKEN_LEN: usize = 32;

pub struct SqlxSessionRepository {
    pub pool: DbPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create_token(&self, user_id: &str) -> anyhow::Result<String> {
        let token: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        sqlx::query("INSERT INTO tokens (token, user_id) VALUES (?, ?)")
            .bind(&token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    async fn find_user_by_token(&self, token: &str) -> anyhow::Result<Option<User>> {
        let sql = format!(
            r#"SELECT user_id, display_name, COALESCE(balance, 0) AS balance
               FROM tokens
               INNER JOIN users USING (user_id)
               LEFT JOIN ({BALANCE_ENTRIES}) USING (user_id)
               WHERE token = ?"#
        );
        let row = sqlx::query(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| User {
            user_id: r.get("user_id"),
            display_name: r.get("display_name"),
            balance: r.get("balance"),
        }))
    }

    async fn delete_token(&self, token: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
