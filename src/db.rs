use sqlx::{PgPool, Row};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn read_slot(pool: &PgPool, slot: &str) -> anyhow::Result<Option<String>> {
    let row = sqlx::query(
        r#"
        SELECT payload::text AS payload
        FROM early_signal.kv_slots
        WHERE slot = $1
        "#,
    )
    .bind(slot)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| row.get("payload")))
}

pub async fn write_slot(pool: &PgPool, slot: &str, payload: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO early_signal.kv_slots (slot, payload, updated_at)
        VALUES ($1, $2::jsonb, now())
        ON CONFLICT (slot) DO UPDATE
        SET payload = EXCLUDED.payload, updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(slot)
    .bind(payload)
    .execute(pool)
    .await?;

    Ok(())
}
