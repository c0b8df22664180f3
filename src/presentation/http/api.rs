use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::application::ports::ledger_repository::LedgerError;
use crate::application::use_cases::ledger::list_balances::ListBalances;
use crate::application::use_cases::ledger::list_transactions::ListTransactions;
use crate::application::use_cases::ledger::record_transaction::RecordTransaction;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceEntry {
    pub user_id: String,
    pub display_name: String,
    /// Pence. Negative means the user owes the group.
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiTransaction {
    pub shafter: String,
    pub shaftee: String,
    /// Pence owed to the shafter.
    pub amount: i64,
    /// Unix timestamp of the transaction.
    pub time_sec: i64,
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShaftUserRequest {
    /// The user owing the money.
    pub other_user: String,
    /// Pence. Positive means the caller is owed money by `other_user`.
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/balances", get(get_balances))
        .route("/transactions", get(get_transactions))
        .route("/shaft", post(shaft_user))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/balances", tag = "Ledger", responses(
    (status = 200, description = "All users keyed by user id, with balances in pence")
))]
pub async fn get_balances(
    State(ctx): State<AppContext>,
    _user: AuthenticatedUser,
) -> Result<Json<BTreeMap<String, BalanceEntry>>, StatusCode> {
    let users = ctx.users();
    let balances = ListBalances {
        users: users.as_ref(),
    }
    .execute()
    .await
    .map_err(|err| {
        error!(error = ?err, "list_balances_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(
        balances
            .into_iter()
            .map(|u| {
                (
                    u.user_id.clone(),
                    BalanceEntry {
                        user_id: u.user_id,
                        display_name: u.display_name,
                        balance: u.balance,
                    },
                )
            })
            .collect(),
    ))
}

#[utoipa::path(get, path = "/api/transactions", tag = "Ledger", responses(
    (status = 200, body = [ApiTransaction])
))]
pub async fn get_transactions(
    State(ctx): State<AppContext>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<ApiTransaction>>, StatusCode> {
    let ledger = ctx.ledger();
    let recent = ListTransactions {
        ledger: ledger.as_ref(),
    }
    .execute()
    .await
    .map_err(|err| {
        error!(error = ?err, "list_transactions_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(
        recent
            .into_iter()
            .map(|t| ApiTransaction {
                shafter: t.shafter,
                shaftee: t.shaftee,
                amount: t.amount,
                time_sec: t.datetime.timestamp(),
                reason: t.reason,
            })
            .collect(),
    ))
}

#[utoipa::path(post, path = "/api/shaft", tag = "Ledger", request_body = ShaftUserRequest, responses(
    (status = 200, description = "Transaction committed"),
    (status = 400, body = ErrorResponse)
))]
pub async fn shaft_user(
    State(ctx): State<AppContext>,
    user: AuthenticatedUser,
    Json(req): Json<ShaftUserRequest>,
) -> Response {
    let ledger = ctx.ledger();
    let uc = RecordTransaction {
        ledger: ledger.as_ref(),
    };
    match uc
        .execute(&user.user_id, &req.other_user, req.amount, &req.reason)
        .await
    {
        Ok(()) => {
            info!(
                other_user = %req.other_user,
                amount = req.amount,
                "transaction_recorded"
            );
            Json(serde_json::json!({})).into_response()
        }
        Err(LedgerError::UnknownUser { user_id }) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("unknown user: {user_id}"),
            }),
        )
            .into_response(),
        Err(LedgerError::Other(err)) => {
            error!(error = ?err, "record_transaction_failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
