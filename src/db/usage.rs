//! Usage counter persistence
//!
//! Increments keep the read-then-write shape of the upstream
//! dashboard: two concurrent increments for one user can both read the
//! same count and write the same value, letting the ceiling be
//! exceeded by a small margin under load. Accepted for this tier of
//! enforcement.

use chrono::Utc;
use sqlx::SqlitePool;

/// Current counter for a user, if a row exists.
pub async fn get_count(db: &SqlitePool, user_id: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT count FROM user_api_limits WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Add one to the user's counter, creating the row at 1.
pub async fn increment(db: &SqlitePool, user_id: &str) -> Result<(), sqlx::Error> {
    let now = Utc::now();

    match get_count(db, user_id).await? {
        Some(count) => {
            sqlx::query("UPDATE user_api_limits SET count = ?, updated_at = ? WHERE user_id = ?")
                .bind(count + 1)
                .bind(now)
                .bind(user_id)
                .execute(db)
                .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO user_api_limits (user_id, count, created_at, updated_at) VALUES (?, 1, ?, ?)",
            )
            .bind(user_id)
            .bind(now)
            .bind(now)
            .execute(db)
            .await?;
        }
    }

    Ok(())
}

/// Zero the counter; a user without a row stays without one.
pub async fn reset(db: &SqlitePool, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_api_limits SET count = 0, updated_at = ? WHERE user_id = ?")
        .bind(Utc::now())
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(())
}
