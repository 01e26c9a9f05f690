use sqlx::SqliteExecutor;

/// Atomically bump the named counter and return its new value. The first
/// call for a key returns 1.
pub async fn increment<'e>(db: impl SqliteExecutor<'e>, key: &str) -> Result<i64, sqlx::Error> {
    let (sequence,): (i64,) = sqlx::query_as(
        "INSERT INTO counters (id, sequence) VALUES (?, 1)
         ON CONFLICT(id) DO UPDATE SET sequence = sequence + 1
         RETURNING sequence",
    )
    .bind(key)
    .fetch_one(db)
    .await?;
    Ok(sequence)
}
