//! Queries against `newsletter_subscriptions`.
//!
//! Every state transition is a single conditional UPDATE guarded on the
//! current status, so concurrent requests for the same email race safely:
//! the loser matches zero rows and gets `None` back.

use crate::models::Subscription;
use sqlx::PgPool;

const COLUMNS: &str = "id, email, user_id, status, confirmation_token, \
                       confirmed_at, unsubscribed_at, created_at, updated_at";

pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM newsletter_subscriptions
        WHERE email = $1
        "#
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_token(pool: &PgPool, token: &str) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM newsletter_subscriptions
        WHERE confirmation_token = $1
        "#
    ))
    .bind(token)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    id: &str,
    email: &str,
    user_id: Option<&str>,
    token: &str,
) -> Result<Subscription, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        INSERT INTO newsletter_subscriptions (id, email, user_id, status, confirmation_token)
        VALUES ($1, $2, $3, 'pending', $4)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(email)
    .bind(user_id)
    .bind(token)
    .fetch_one(pool)
    .await
}

/// Rotate the confirmation token of a still-pending row. The old token stops
/// matching anything the moment this commits.
pub async fn refresh_token(
    pool: &PgPool,
    id: &str,
    token: &str,
) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        UPDATE newsletter_subscriptions
        SET confirmation_token = $1, updated_at = now()
        WHERE id = $2 AND status = 'pending'
        RETURNING {COLUMNS}
        "#
    ))
    .bind(token)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Move an unsubscribed row back to pending with a fresh token.
pub async fn reactivate(
    pool: &PgPool,
    id: &str,
    token: &str,
    user_id: Option<&str>,
) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        UPDATE newsletter_subscriptions
        SET status = 'pending', confirmation_token = $1,
            user_id = COALESCE($2, user_id),
            unsubscribed_at = NULL, updated_at = now()
        WHERE id = $3 AND status = 'unsubscribed'
        RETURNING {COLUMNS}
        "#
    ))
    .bind(token)
    .bind(user_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Consume the token: pending -> confirmed, token cleared in the same
/// statement so it can never be replayed.
pub async fn confirm(pool: &PgPool, id: &str) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        UPDATE newsletter_subscriptions
        SET status = 'confirmed', confirmed_at = now(),
            confirmation_token = NULL, updated_at = now()
        WHERE id = $1 AND status = 'pending'
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn unsubscribe(pool: &PgPool, id: &str) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        UPDATE newsletter_subscriptions
        SET status = 'unsubscribed', unsubscribed_at = now(), updated_at = now()
        WHERE id = $1 AND status IN ('pending', 'confirmed')
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}
