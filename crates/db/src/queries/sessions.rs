use sqlx::PgPool;

/// Resolve a hashed session token to its owning user, if the session is
/// still live. Used to attach `user_id` to subscriptions created by
/// logged-in callers.
pub async fn find_user_by_token_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT user_id
        FROM user_sessions
        WHERE token_hash = $1 AND expires_at > now()
        LIMIT 1
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(user_id,)| user_id))
}
