use axum::{
    Router,
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use htmlescape::{encode_attribute, encode_minimal as escape_html};
use serde::Deserialize;
use tracing::{error, info};

use crate::application::ports::ledger_repository::LedgerError;
use crate::application::use_cases::auth::authenticate::AuthenticateSession;
use crate::application::use_cases::ledger::list_balances::ListBalances;
use crate::application::use_cases::ledger::list_transactions::ListTransactions;
use crate::application::use_cases::ledger::record_transaction::RecordTransaction;
use crate::bootstrap::app_context::AppContext;
use crate::domain::ledger::{Transaction, User};
use crate::presentation::http::auth::{AuthenticatedUser, SessionToken};
use crate::presentation::http::found;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", get(show_login))
        .route("/home", get(home))
        .route("/transactions", get(transactions))
        // GET /shaft is a form mis-navigation, not an action; send it back home.
        .route("/shaft", get(root).post(shaft_user))
        .with_state(ctx)
}

/// The top level root. Bounces to the balances page or the login page
/// depending on whether the token cookie resolves to a session.
async fn root(
    State(ctx): State<AppContext>,
    token: Option<SessionToken>,
) -> Result<Response, StatusCode> {
    if let Some(SessionToken(token)) = token {
        let sessions = ctx.sessions();
        let uc = AuthenticateSession {
            sessions: sessions.as_ref(),
        };
        let known = uc
            .execute(&token)
            .await
            .map_err(|err| {
                error!(error = ?err, "session_lookup_failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .is_some();
        if known {
            return Ok(found("home"));
        }
    }
    Ok(found("login"))
}

async fn show_login(State(ctx): State<AppContext>) -> Html<String> {
    let root = &ctx.cfg.web_root;
    let body = format!(
        "<h1>Shaft</h1>\n\
         <p>Track who owes whom. Sign in with your GitHub account to see the ledger.</p>\n\
         <p><a class=\"login-button\" href=\"{root}/github/login\">Sign in with GitHub</a></p>"
    );
    Html(page_shell(root, "Sign in", None, &body))
}

async fn home(
    State(ctx): State<AppContext>,
    user: AuthenticatedUser,
) -> Result<Html<String>, StatusCode> {
    render_home(&ctx, &user, None).await
}

async fn transactions(
    State(ctx): State<AppContext>,
    user: AuthenticatedUser,
) -> Result<Html<String>, StatusCode> {
    let users = ctx.users();
    let ledger = ctx.ledger();
    let all_users = ListBalances {
        users: users.as_ref(),
    }
    .execute()
    .await
    .map_err(|err| {
        error!(error = ?err, "list_balances_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let recent = ListTransactions {
        ledger: ledger.as_ref(),
    }
    .execute()
    .await
    .map_err(|err| {
        error!(error = ?err, "list_transactions_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Html(transactions_html(
        &ctx.cfg.web_root,
        &user,
        &recent,
        &all_users,
    )))
}

/// The body of a form request to shaft the given user.
#[derive(Debug, Deserialize)]
struct ShaftUserForm {
    other_user: String,
    /// Pence owed. Positive means the submitter is owed money.
    amount: i64,
    reason: String,
}

async fn shaft_user(
    State(ctx): State<AppContext>,
    user: AuthenticatedUser,
    Form(form): Form<ShaftUserForm>,
) -> Result<Response, StatusCode> {
    let ledger = ctx.ledger();
    let uc = RecordTransaction {
        ledger: ledger.as_ref(),
    };
    match uc
        .execute(&user.user_id, &form.other_user, form.amount, &form.reason)
        .await
    {
        Ok(()) => {
            info!(
                other_user = %form.other_user,
                amount = form.amount,
                "transaction_recorded"
            );
            render_home(&ctx, &user, Some(&form.reason))
                .await
                .map(IntoResponse::into_response)
        }
        Err(LedgerError::UnknownUser { user_id }) => Ok((
            StatusCode::BAD_REQUEST,
            format!("unknown user: {user_id}"),
        )
            .into_response()),
        Err(LedgerError::Other(err)) => {
            error!(error = ?err, "record_transaction_failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn render_home(
    ctx: &AppContext,
    user: &AuthenticatedUser,
    preserved_reason: Option<&str>,
) -> Result<Html<String>, StatusCode> {
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
    Ok(Html(home_html(
        &ctx.cfg.web_root,
        user,
        &balances,
        preserved_reason,
    )))
}

// --- HTML rendering ---

fn page_shell(web_root: &str, title: &str, user: Option<&AuthenticatedUser>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            "<nav>\n\
             <span class=\"whoami\">{name}</span>\n\
             <a href=\"{root}/home\">Balances</a>\n\
             <a href=\"{root}/transactions\">Transactions</a>\n\
             <form class=\"logout\" method=\"post\" action=\"{root}/logout\">\
             <button type=\"submit\">Sign out</button></form>\n\
             </nav>\n",
            name = escape_html(&user.display_name),
            root = web_root,
        ),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\" />\n\
         <title>{title} - Shaft</title>\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
         <link rel=\"stylesheet\" href=\"{root}/static/shaft.css\" />\n\
         </head>\n\
         <body>\n\
         {nav}\
         <main>\n\
         {body}\n\
         </main>\n\
         </body>\n\
         </html>\n",
        title = escape_html(title),
        root = web_root,
        nav = nav,
        body = body,
    )
}

fn home_html(
    web_root: &str,
    user: &AuthenticatedUser,
    balances: &[User],
    preserved_reason: Option<&str>,
) -> String {
    let mut rows = String::new();
    for u in balances {
        let class = if u.balance < 0 { "negative" } else { "positive" };
        rows.push_str(&format!(
            "<tr class=\"{class}\"><td>{name}</td><td>{amount}</td></tr>\n",
            name = escape_html(&u.display_name),
            amount = format_pence_as_pounds(u.balance),
        ));
    }

    let mut options = String::new();
    for u in balances.iter().filter(|u| u.user_id != user.user_id) {
        options.push_str(&format!(
            "<option value=\"{id}\">{name}</option>\n",
            id = encode_attribute(&u.user_id),
            name = escape_html(&u.display_name),
        ));
    }

    let body = format!(
        "<h1>Balances</h1>\n\
         <table class=\"balances\">\n\
         <tr><th>Member</th><th>Balance</th></tr>\n\
         {rows}\
         </table>\n\
         <h2>Record a debt</h2>\n\
         <form method=\"post\" action=\"{root}/shaft\">\n\
         <label>Who owes you? <select name=\"other_user\">\n{options}</select></label>\n\
         <label>Amount (pence) <input type=\"number\" name=\"amount\" value=\"0\" /></label>\n\
         <label>Reason <input type=\"text\" name=\"reason\" value=\"{reason}\" /></label>\n\
         <button type=\"submit\">Shaft</button>\n\
         </form>",
        root = web_root,
        rows = rows,
        options = options,
        reason = encode_attribute(preserved_reason.unwrap_or("")),
    );

    page_shell(web_root, "Balances", Some(user), &body)
}

fn transactions_html(
    web_root: &str,
    user: &AuthenticatedUser,
    transactions: &[Transaction],
    all_users: &[User],
) -> String {
    let display_name = |id: &str| -> String {
        all_users
            .iter()
            .find(|u| u.user_id == id)
            .map(|u| u.display_name.as_str())
            .unwrap_or(id)
            .to_string()
    };

    let mut rows = String::new();
    for txn in transactions {
        rows.push_str(&format!(
            "<tr><td>{date}</td><td>{shafter}</td><td>{shaftee}</td>\
             <td>{amount}</td><td>{reason}</td></tr>\n",
            date = txn.datetime.format("%d %b %Y"),
            shafter = escape_html(&display_name(&txn.shafter)),
            shaftee = escape_html(&display_name(&txn.shaftee)),
            amount = format_pence_as_pounds(txn.amount),
            reason = escape_html(&txn.reason),
        ));
    }

    let body = format!(
        "<h1>Recent transactions</h1>\n\
         <table class=\"transactions\">\n\
         <tr><th>Date</th><th>Owed to</th><th>Owed by</th><th>Amount</th><th>Reason</th></tr>\n\
         {rows}\
         </table>",
    );

    page_shell(web_root, "Transactions", Some(user), &body)
}

/// Format pence into a pretty pounds string.
fn format_pence_as_pounds(pence: i64) -> String {
    if pence < 0 {
        format!("-£{:2}.{:02}", -pence / 100, -pence % 100)
    } else {
        format!("£{:2}.{:02}", pence / 100, pence % 100)
    }
}
