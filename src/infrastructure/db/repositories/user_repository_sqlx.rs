use async_trait::async_trait;
use sqlx::Row;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::ledger::User;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::repositories::BALANCE_ENTRIES;

pub struct SqlxUserRepository {
    pub pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn find_by_github_id(&self, github_id: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT user_id FROM github_users WHERE github_id = ?")
            .bind(github_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("user_id")))
    }

    async fn create_from_github(
        &self,
        github_id: &str,
        display_name: &str,
    ) -> anyhow::Result<String> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO users (user_id, display_name) VALUES (?, ?)")
            .bind(github_id)
            .bind(display_name)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO github_users (user_id, github_id) VALUES (?, ?)")
            .bind(github_id)
            .bind(github_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(github_id.to_owned())
    }

    async fn list_with_balances(&self) -> anyhow::Result<Vec<User>> {
        let sql = format!(
            r#"SELECT user_id, display_name, COALESCE(balance, 0) AS balance
               FROM users
               LEFT JOIN ({BALANCE_ENTRIES}) USING (user_id)
               ORDER BY balance ASC"#
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|r| User {
                user_id: r.get("user_id"),
                display_name: r.get("display_name"),
                balance: r.get("balance"),
            })
            .collect())
    }

    async fn balance_of(&self, user_id: &str) -> anyhow::Result<i64> {
        let balance = sqlx::query_scalar::<_, i64>(
            r#"SELECT (
                   SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE shafter = ?
               ) - (
                   SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE shaftee = ?
               )"#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(balance)
    }
}
