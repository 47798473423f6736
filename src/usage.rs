//! Usage-limit gating.
//!
//! One service instance wraps the database pool with the free-tier
//! ceiling and the global bypass flag. Counter lookups fail open (a
//! read error reads as count zero); subscription lookups fail closed.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::{subscriptions, usage};

/// Per-user free-tier enforcement.
#[derive(Debug, Clone)]
pub struct UsageGate {
    db: SqlitePool,
    free_tier_limit: u32,
    bypass: bool,
}

impl UsageGate {
    pub fn new(db: SqlitePool, free_tier_limit: u32, bypass: bool) -> Self {
        Self {
            db,
            free_tier_limit,
            bypass,
        }
    }

    pub fn limit(&self) -> u32 {
        self.free_tier_limit
    }

    /// Counter value, with read errors collapsing to zero.
    pub async fn count(&self, user_id: &str) -> u32 {
        match usage::get_count(&self.db, user_id).await {
            Ok(Some(count)) => count.max(0) as u32,
            Ok(None) => 0,
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Usage counter lookup failed, treating as zero");
                0
            }
        }
    }

    /// True while the caller may use gated features. Users without a
    /// counter row pass.
    pub async fn check(&self, user_id: &str) -> bool {
        if self.bypass {
            tracing::debug!("Limit bypass enabled, skipping usage check");
            return true;
        }

        self.count(user_id).await < self.free_tier_limit
    }

    /// Persist one use. No-op when bypassed.
    pub async fn increment(&self, user_id: &str) -> Result<(), sqlx::Error> {
        if self.bypass {
            tracing::debug!("Limit bypass enabled, skipping usage increment");
            return Ok(());
        }

        usage::increment(&self.db, user_id).await
    }

    /// Zero the caller's counter.
    pub async fn reset(&self, user_id: &str) -> Result<(), sqlx::Error> {
        usage::reset(&self.db, user_id).await
    }

    /// Requests left before the ceiling, saturating at zero.
    pub async fn remaining(&self, user_id: &str) -> u32 {
        self.free_tier_limit
            .saturating_sub(self.count(user_id).await)
    }

    /// True when the caller holds a currently valid subscription.
    pub async fn has_active_subscription(&self, user_id: &str) -> bool {
        if self.bypass {
            tracing::debug!("Limit bypass enabled, skipping subscription check");
            return true;
        }

        match subscriptions::get(&self.db, user_id).await {
            Ok(Some(subscription)) => subscription.is_valid_at(Utc::now()),
            Ok(None) => false,
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Subscription lookup failed");
                false
            }
        }
    }
}
