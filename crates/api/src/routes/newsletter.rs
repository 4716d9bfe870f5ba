use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use cadencea_core::email::EmailAddress;
use cadencea_core::ids::{generate_confirmation_token, new_audit_id, new_subscription_id};
use cadencea_core::mailer::Mailer;
use cadencea_core::newsletter::{
    plan_confirm, plan_subscribe, plan_unsubscribe, ConfirmAction, SubscribeAction,
    UnsubscribeAction,
};
use cadencea_db::models::Subscription;
use cadencea_db::queries::{audit, subscriptions};

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth::optional_user_id,
    routes::pages,
    state::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/newsletter/subscribe", post(subscribe))
        .route("/v1/newsletter/confirm", post(confirm).get(confirm_page))
        .route(
            "/v1/newsletter/unsubscribe",
            post(unsubscribe).get(unsubscribe_page),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct SubscribeResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription_id: Option<String>,
    /// Echoed only in development so the flow can be exercised without a
    /// mail inbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<(StatusCode, Json<SubscribeResponse>)> {
    let email = EmailAddress::parse(payload.email)
        .map_err(|_| ApiError::Validation("Invalid email address".to_string()))?;

    let caller_user_id = optional_user_id(&state, &headers).await;

    match subscriptions::get_by_email(&state.db, email.as_str()).await? {
        Some(existing) => subscribe_existing(&state, email, existing, caller_user_id).await,
        None => {
            let token = generate_confirmation_token();
            match subscriptions::create(
                &state.db,
                &new_subscription_id(),
                email.as_str(),
                caller_user_id.as_deref(),
                &token,
            )
            .await
            {
                Ok(record) => {
                    info!(subscription_id = %record.id, "newsletter subscription created");
                    dispatch_confirmation(&state.mailer, email, token.clone());

                    Ok((
                        StatusCode::CREATED,
                        Json(SubscribeResponse {
                            message: "Subscription created! Please check your email to confirm."
                                .to_string(),
                            subscription_id: Some(record.id),
                            token: dev_token(&state, token),
                        }),
                    ))
                }
                // Lost the insert race on the unique email index: a
                // concurrent request created the row between our read and
                // the insert. Re-read and proceed as for an existing row.
                Err(err) if is_unique_violation(&err) => {
                    let existing = subscriptions::get_by_email(&state.db, email.as_str())
                        .await?
                        .ok_or(ApiError::Internal)?;
                    subscribe_existing(&state, email, existing, caller_user_id).await
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}

async fn subscribe_existing(
    state: &AppState,
    email: EmailAddress,
    existing: Subscription,
    caller_user_id: Option<String>,
) -> ApiResult<(StatusCode, Json<SubscribeResponse>)> {
    match plan_subscribe(Some(existing.status.to_core())) {
        // plan_subscribe only creates when no row was passed in.
        SubscribeAction::CreateNew => Err(ApiError::Internal),
        SubscribeAction::AlreadySubscribed => {
            Ok((StatusCode::OK, Json(already_subscribed_response())))
        }
        SubscribeAction::ResendConfirmation => {
            let token = generate_confirmation_token();
            match subscriptions::refresh_token(&state.db, &existing.id, &token).await? {
                Some(record) => {
                    info!(subscription_id = %record.id, "confirmation token rotated");
                    dispatch_confirmation(&state.mailer, email, token.clone());
                    Ok((
                        StatusCode::OK,
                        Json(SubscribeResponse {
                            message: "Confirmation email resent. Please check your inbox."
                                .to_string(),
                            subscription_id: None,
                            token: dev_token(state, token),
                        }),
                    ))
                }
                // Lost a race: the row left pending between the read and the
                // update. The only forward transition from pending that isn't
                // ours is confirmation, so report idempotent success.
                None => Ok((StatusCode::OK, Json(already_subscribed_response()))),
            }
        }
        SubscribeAction::Resubscribe => {
            let token = generate_confirmation_token();
            match subscriptions::reactivate(
                &state.db,
                &existing.id,
                &token,
                caller_user_id.as_deref(),
            )
            .await?
            {
                Some(record) => {
                    info!(subscription_id = %record.id, "unsubscribed email resubscribed");
                    dispatch_confirmation(&state.mailer, email, token.clone());
                    Ok((
                        StatusCode::OK,
                        Json(SubscribeResponse {
                            message: "Subscription renewed! Please check your email to confirm."
                                .to_string(),
                            subscription_id: None,
                            token: dev_token(state, token),
                        }),
                    ))
                }
                None => Ok((StatusCode::OK, Json(already_subscribed_response()))),
            }
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn already_subscribed_response() -> SubscribeResponse {
    SubscribeResponse {
        message: "Email is already subscribed to our newsletter".to_string(),
        subscription_id: None,
        token: None,
    }
}

fn dev_token(state: &AppState, token: String) -> Option<String> {
    state.settings.is_development().then_some(token)
}

/// Fire-and-forget confirmation email. Delivery failures are the mail
/// provider's problem; we only log them.
fn dispatch_confirmation(mailer: &Arc<Mailer>, email: EmailAddress, token: String) {
    let mailer = mailer.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_confirmation(&email, &token).await {
            error!(error = %err, recipient = %email, "confirmation email dispatch failed");
        }
    });
}

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    token: String,
}

#[derive(Debug, Serialize)]
struct ConfirmResponse {
    message: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmed_at: Option<DateTime<Utc>>,
}

enum ConfirmOutcome {
    Confirmed(Subscription),
    AlreadyConfirmed(Subscription),
}

async fn run_confirm(state: &AppState, token: &str) -> ApiResult<ConfirmOutcome> {
    if token.is_empty() {
        return Err(ApiError::Validation(
            "Confirmation token is required".to_string(),
        ));
    }

    let subscription = subscriptions::get_by_token(&state.db, token)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    match plan_confirm(subscription.status.to_core()) {
        ConfirmAction::AlreadyConfirmed => Ok(ConfirmOutcome::AlreadyConfirmed(subscription)),
        ConfirmAction::RequiresResubscribe => Err(ApiError::InvalidState(
            "This email has been unsubscribed. Please subscribe again if you wish to receive our newsletter."
                .to_string(),
        )),
        ConfirmAction::Apply => {
            let updated = subscriptions::confirm(&state.db, &subscription.id)
                .await?
                // Lost a race: the token was consumed or invalidated after
                // our read. Indistinguishable from a stale token.
                .ok_or(ApiError::InvalidToken)?;
            info!(subscription_id = %updated.id, "newsletter subscription confirmed");
            record_audit(
                state,
                "newsletter_confirmed",
                &updated.id,
                json!({ "status": "confirmed", "email": updated.email }),
            )
            .await;
            Ok(ConfirmOutcome::Confirmed(updated))
        }
    }
}

async fn confirm(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> ApiResult<Json<ConfirmResponse>> {
    match run_confirm(&state, &payload.token).await? {
        ConfirmOutcome::Confirmed(sub) => Ok(Json(ConfirmResponse {
            message: "Email confirmed successfully! You are now subscribed to our newsletter."
                .to_string(),
            email: sub.email,
            confirmed_at: sub.confirmed_at,
        })),
        ConfirmOutcome::AlreadyConfirmed(sub) => Ok(Json(ConfirmResponse {
            message: "Email is already confirmed and subscribed to our newsletter".to_string(),
            email: sub.email,
            confirmed_at: None,
        })),
    }
}

#[derive(Debug, Deserialize)]
struct ConfirmPageQuery {
    token: Option<String>,
}

/// Email-link variant: same semantics as the JSON route, rendered as a
/// landing page.
async fn confirm_page(
    State(state): State<AppState>,
    Query(query): Query<ConfirmPageQuery>,
) -> (StatusCode, Html<String>) {
    let token = match query.token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => return (StatusCode::BAD_REQUEST, Html(pages::confirm_invalid())),
    };

    match run_confirm(&state, token).await {
        Ok(ConfirmOutcome::Confirmed(sub)) => {
            (StatusCode::OK, Html(pages::confirm_success(&sub.email)))
        }
        Ok(ConfirmOutcome::AlreadyConfirmed(_)) => {
            (StatusCode::OK, Html(pages::confirm_already()))
        }
        Err(ApiError::InvalidState(_)) => {
            (StatusCode::BAD_REQUEST, Html(pages::confirm_unsubscribed()))
        }
        Err(ApiError::InvalidToken | ApiError::Validation(_)) => {
            (StatusCode::BAD_REQUEST, Html(pages::confirm_invalid()))
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())),
    }
}

#[derive(Debug, Deserialize)]
struct UnsubscribeRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct UnsubscribeResponse {
    message: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unsubscribed_at: Option<DateTime<Utc>>,
}

enum UnsubscribeOutcome {
    Unsubscribed(Subscription),
    AlreadyUnsubscribed(Subscription),
}

async fn run_unsubscribe(state: &AppState, email: &str) -> ApiResult<UnsubscribeOutcome> {
    let email = EmailAddress::parse(email.to_string())
        .map_err(|_| ApiError::Validation("Invalid email address".to_string()))?;

    let subscription = subscriptions::get_by_email(&state.db, email.as_str())
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Email not found in our newsletter database".to_string())
        })?;

    match plan_unsubscribe(subscription.status.to_core()) {
        UnsubscribeAction::AlreadyUnsubscribed => {
            Ok(UnsubscribeOutcome::AlreadyUnsubscribed(subscription))
        }
        UnsubscribeAction::Apply => {
            match subscriptions::unsubscribe(&state.db, &subscription.id).await? {
                Some(updated) => {
                    info!(subscription_id = %updated.id, "newsletter subscription unsubscribed");
                    record_audit(
                        state,
                        "newsletter_unsubscribed",
                        &updated.id,
                        json!({ "status": "unsubscribed", "email": updated.email }),
                    )
                    .await;
                    Ok(UnsubscribeOutcome::Unsubscribed(updated))
                }
                // Lost a race with a concurrent unsubscribe; same outcome.
                None => Ok(UnsubscribeOutcome::AlreadyUnsubscribed(subscription)),
            }
        }
    }
}

async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> ApiResult<Json<UnsubscribeResponse>> {
    match run_unsubscribe(&state, &payload.email).await? {
        UnsubscribeOutcome::Unsubscribed(sub) => Ok(Json(UnsubscribeResponse {
            message: "Successfully unsubscribed from our newsletter".to_string(),
            email: sub.email,
            unsubscribed_at: sub.unsubscribed_at,
        })),
        UnsubscribeOutcome::AlreadyUnsubscribed(sub) => Ok(Json(UnsubscribeResponse {
            message: "Email is already unsubscribed from our newsletter".to_string(),
            email: sub.email,
            unsubscribed_at: None,
        })),
    }
}

#[derive(Debug, Deserialize)]
struct UnsubscribePageQuery {
    email: Option<String>,
}

async fn unsubscribe_page(
    State(state): State<AppState>,
    Query(query): Query<UnsubscribePageQuery>,
) -> (StatusCode, Html<String>) {
    let email = match query.email.as_deref() {
        Some(email) if !email.is_empty() => email,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Html(pages::unsubscribe_missing_email()),
            )
        }
    };

    match run_unsubscribe(&state, email).await {
        Ok(UnsubscribeOutcome::Unsubscribed(sub)) => {
            (StatusCode::OK, Html(pages::unsubscribe_success(&sub.email)))
        }
        Ok(UnsubscribeOutcome::AlreadyUnsubscribed(_)) => {
            (StatusCode::OK, Html(pages::unsubscribe_already()))
        }
        Err(ApiError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Html(pages::unsubscribe_not_found()))
        }
        Err(ApiError::Validation(_)) => (
            StatusCode::BAD_REQUEST,
            Html(pages::unsubscribe_invalid_email()),
        ),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())),
    }
}


/// Best-effort audit append; a logging failure never fails the request.
async fn record_audit(state: &AppState, action: &str, record_id: &str, new_values: serde_json::Value) {
    if let Err(err) = audit::append(
        &state.db,
        &new_audit_id(),
        action,
        "newsletter_subscriptions",
        record_id,
        new_values,
    )
    .await
    {
        warn!(error = %err, action, record_id, "audit log append failed");
    }
}
