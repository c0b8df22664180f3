use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    /// Pence. Negative means the user owes the group.
    pub balance: i64,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub shafter: String,
    pub shaftee: String,
    /// Pence. Positive means the shafter is owed this amount by the shaftee.
    pub amount: i64,
    pub datetime: DateTime<Utc>,
    pub reason: String,
}
