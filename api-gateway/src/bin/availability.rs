//! Availability API Lambda - the shared calendar's queries and toggle.
//!
//! Endpoints:
//! - GET /availability - every user's unavailable days for a month
//! - GET /availability/me - the caller's unavailable days for a month
//! - POST /availability/toggle - flip the caller's marker for one day

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shared::auth::caller_identity;
use shared::availability::{
    get_current_user_unavailability, get_unavailability_for_month, toggle_unavailability,
};
use shared::http::{error_response, failure_response, json_response};
use shared::models::{ToggleRequest, ToggleResponse};
use shared::store::AvailabilityStore;
use shared::{parse_body, ApiResponse, Config};

/// Application state
struct AppState {
    store: AvailabilityStore,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env();
        let pool = shared::db::create_pool(&config).await?;
        shared::db::run_migrations(&pool).await?;

        Ok(Self {
            store: AvailabilityStore::new(pool),
        })
    }
}

/// Extract the required integer `year` and `month` query parameters.
fn month_params(event: &Request) -> Option<(i32, i32)> {
    let params = event.query_string_parameters();
    let year = params.first("year")?.parse().ok()?;
    let month = params.first("month")?.parse().ok()?;
    Some((year, month))
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present (API Gateway REST API includes stage in path)
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);

    info!("Availability request: {} {}", method, path);

    match (method, path) {
        // Everyone's unavailability for a month
        ("GET", "/availability") => {
            let Some((year, month)) = month_params(&event) else {
                return error_response(400, "year and month query parameters are required");
            };

            match get_unavailability_for_month(&state.store, year, month).await {
                Ok(entries) => json_response(200, &ApiResponse::success(entries)),
                Err(err) => failure_response(&err),
            }
        }

        // The caller's own unavailable dates for a month
        ("GET", "/availability/me") => {
            let Some((year, month)) = month_params(&event) else {
                return error_response(400, "year and month query parameters are required");
            };
            let caller = caller_identity(&event);

            match get_current_user_unavailability(
                &state.store,
                caller.as_ref().map(|user| user.user_id.as_str()),
                year,
                month,
            )
            .await
            {
                Ok(dates) => json_response(200, &ApiResponse::success(dates)),
                Err(err) => failure_response(&err),
            }
        }

        // Flip the caller's marker for one date
        ("POST", "/availability/toggle") => {
            let caller = caller_identity(&event);
            let request: ToggleRequest = parse_body!(event.body());

            match toggle_unavailability(
                &state.store,
                caller.as_ref().map(|user| user.user_id.as_str()),
                &request.date,
            )
            .await
            {
                Ok(unavailable) => json_response(
                    200,
                    &ApiResponse::success(ToggleResponse {
                        date: request.date,
                        unavailable,
                    }),
                ),
                Err(err) => failure_response(&err),
            }
        }

        _ => error_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
