pub mod ledger_repository_sqlx;
pub mod session_repository_sqlx;
pub mod user_repository_sqlx;

/// Per-user balance entries derived from the transaction log: credits where
/// the user is shafter, debits where they are shaftee. Joined against `users`
/// or `tokens` by the repositories that need a balance column.
pub(crate) const BALANCE_ENTRIES: &str = r#"
    SELECT user_id, SUM(amount) AS balance
    FROM (
        SELECT shafter AS user_id, SUM(amount) AS amount
        FROM transactions GROUP BY shafter
        UNION ALL
        SELECT shaftee AS user_id, -SUM(amount) AS amount
        FROM transactions GROUP BY shaftee
    ) AS entries
    GROUP BY user_id
"#;

#[cfg(test)]
pub(crate) async fn test_pool() -> crate::infrastructure::db::DbPool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}
