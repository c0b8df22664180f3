use axum::Router;
use axum::extract::MatchedPath;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::AppContext;
use crate::infrastructure::db::DbPool;

pub mod api;
pub mod auth;
pub mod health;
pub mod pages;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::get_balances,
        api::get_transactions,
        api::shaft_user,
        health::health,
    ),
    components(schemas(
        api::BalanceEntry,
        api::ApiTransaction,
        api::ShaftUserRequest,
        api::ErrorResponse,
        health::HealthResp,
    )),
    tags(
        (name = "Ledger", description = "Balances and committed transactions"),
        (name = "Health", description = "System health checks")
    )
)]
struct ApiDoc;

/// The full application router. `main` serves it; the integration tests
/// drive it directly.
pub fn build_app(ctx: AppContext, pool: DbPool) -> Router {
    Router::new()
        .merge(pages::routes(ctx.clone()))
        .merge(auth::routes(ctx.clone()))
        .merge(health::routes(pool))
        .nest("/api", api::routes(ctx.clone()))
        .nest_service("/static", ServeDir::new(&ctx.cfg.static_dir))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        )
}

/// A plain 302, matching the redirects browsers get from the page flow.
pub(crate) fn found(location: &str) -> Response {
    match header::HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
