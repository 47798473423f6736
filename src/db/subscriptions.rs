//! Subscription record persistence
//!
//! Rows are written by the external billing pipeline (or tests); this
//! service only reads them to decide whether a caller is exempt from
//! the free-tier ceiling.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

/// Grace period added to the period end before a subscription counts
/// as lapsed.
pub const GRACE_PERIOD_MS: i64 = 86_400_000;

/// Stored subscription state for one user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSubscription {
    pub user_id: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_current_period_end: Option<DateTime<Utc>>,
}

impl UserSubscription {
    /// Valid while a price id is set and the period end plus one day of
    /// grace is still in the future.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let has_price = self
            .stripe_price_id
            .as_deref()
            .is_some_and(|p| !p.is_empty());
        let Some(period_end) = self.stripe_current_period_end else {
            return false;
        };

        has_price && period_end + Duration::milliseconds(GRACE_PERIOD_MS) > now
    }
}

/// Fetch a user's subscription row, if any.
pub async fn get(db: &SqlitePool, user_id: &str) -> Result<Option<UserSubscription>, sqlx::Error> {
    sqlx::query_as::<_, UserSubscription>(
        "SELECT user_id, stripe_customer_id, stripe_subscription_id, stripe_price_id, stripe_current_period_end \
         FROM user_subscriptions WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Insert or replace a subscription row.
pub async fn upsert(db: &SqlitePool, subscription: &UserSubscription) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT OR REPLACE INTO user_subscriptions \
         (user_id, stripe_customer_id, stripe_subscription_id, stripe_price_id, stripe_current_period_end) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&subscription.user_id)
    .bind(&subscription.stripe_customer_id)
    .bind(&subscription.stripe_subscription_id)
    .bind(&subscription.stripe_price_id)
    .bind(subscription.stripe_current_period_end)
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(price_id: Option<&str>, period_end: Option<DateTime<Utc>>) -> UserSubscription {
        UserSubscription {
            user_id: "user-1".to_string(),
            stripe_customer_id: Some("cus_123".to_string()),
            stripe_subscription_id: Some("sub_123".to_string()),
            stripe_price_id: price_id.map(|s| s.to_string()),
            stripe_current_period_end: period_end,
        }
    }

    #[test]
    fn valid_through_the_period_and_one_day_of_grace() {
        let now = Utc::now();

        let active = subscription(Some("price_123"), Some(now + Duration::days(10)));
        assert!(active.is_valid_at(now));

        // Period ended two hours ago but the day of grace still holds.
        let in_grace = subscription(Some("price_123"), Some(now - Duration::hours(2)));
        assert!(in_grace.is_valid_at(now));

        let lapsed = subscription(Some("price_123"), Some(now - Duration::days(2)));
        assert!(!lapsed.is_valid_at(now));
    }

    #[test]
    fn incomplete_rows_are_never_valid() {
        let now = Utc::now();
        let future = Some(now + Duration::days(10));

        assert!(!subscription(None, future).is_valid_at(now));
        assert!(!subscription(Some(""), future).is_valid_at(now));
        assert!(!subscription(Some("price_123"), None).is_valid_at(now));
    }

    #[tokio::test]
    async fn rows_round_trip_through_sqlite() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();

        assert!(get(&pool, "user-1").await.unwrap().is_none());

        let period_end = Utc::now() + Duration::days(30);
        upsert(&pool, &subscription(Some("price_123"), Some(period_end))).await.unwrap();

        let stored = get(&pool, "user-1").await.unwrap().unwrap();
        assert_eq!(stored.stripe_price_id.as_deref(), Some("price_123"));
        assert!(stored.is_valid_at(Utc::now()));
    }
}
