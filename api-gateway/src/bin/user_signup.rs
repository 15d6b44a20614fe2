//! User Signup Lambda - identity provider post-confirmation trigger.
//!
//! Runs after a user confirms their account and records them in the user
//! directory so month queries can show a display name next to their
//! markers.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use shared::store::AvailabilityStore;
use shared::Config;

/// Post-confirmation trigger event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationEvent {
    version: String,
    trigger_source: String,
    region: String,
    user_pool_id: String,
    user_name: String,
    request: ConfirmationRequest,
    response: ConfirmationResponse,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationRequest {
    user_attributes: UserAttributes,
}

#[derive(Debug, Deserialize, Serialize)]
struct UserAttributes {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "custom:display_name")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ConfirmationResponse {}

/// Response must match the input structure for identity provider triggers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationReply {
    version: String,
    trigger_source: String,
    region: String,
    user_pool_id: String,
    user_name: String,
    request: serde_json::Value,
    response: ConfirmationResponse,
}

/// Echo the event back to the identity provider in its required shape.
fn reply(trigger: ConfirmationEvent) -> Result<ConfirmationReply, Error> {
    Ok(ConfirmationReply {
        request: serde_json::to_value(&trigger.request)?,
        version: trigger.version,
        trigger_source: trigger.trigger_source,
        region: trigger.region,
        user_pool_id: trigger.user_pool_id,
        user_name: trigger.user_name,
        response: trigger.response,
    })
}

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

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<ConfirmationEvent>,
) -> Result<ConfirmationReply, Error> {
    let trigger = event.payload;

    info!(
        "Processing {} trigger for user {}",
        trigger.trigger_source, trigger.user_name
    );

    // Only PostConfirmation triggers provision a directory row; anything
    // else passes straight through.
    if !trigger.trigger_source.starts_with("PostConfirmation") {
        info!("Skipping non-PostConfirmation trigger");
        return reply(trigger);
    }

    let attrs = &trigger.request.user_attributes;
    if let Err(err) = Uuid::parse_str(&attrs.sub) {
        return Err(format!("Invalid user sub {}: {}", attrs.sub, err).into());
    }

    let display_name = attrs
        .display_name
        .clone()
        .or_else(|| attrs.name.clone())
        .unwrap_or_else(|| attrs.email.split('@').next().unwrap_or("User").to_string());

    match state
        .store
        .upsert_user(&attrs.sub, Some(&attrs.email), Some(&display_name))
        .await
    {
        Ok(()) => info!("Registered user {} ({})", attrs.sub, attrs.email),
        // Don't fail the confirmation flow - the user can still sign in
        Err(err) => error!("Failed to register user {}: {}", attrs.sub, err),
    }

    reply(trigger)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
