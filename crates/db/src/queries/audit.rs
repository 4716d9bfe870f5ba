use sqlx::PgPool;

/// Append one row to the audit trail. Callers treat failure as
/// non-fatal: the primary transition has already committed.
pub async fn append(
    pool: &PgPool,
    id: &str,
    action: &str,
    table_name: &str,
    record_id: &str,
    new_values: serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (id, action, table_name, record_id, new_values)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(action)
    .bind(table_name)
    .bind(record_id)
    .bind(new_values)
    .execute(pool)
    .await?;
    Ok(())
}
