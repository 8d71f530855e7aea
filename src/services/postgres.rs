use crate::models::{
    ApprovalStatus, DeclinedProfile, InteractionHistory, MatchRecord, MatchStatus, Profile,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Postgres-side mirror of [`MatchStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "interest_status", rename_all = "lowercase")]
pub enum InterestRowStatus {
    Pending,
    Accepted,
    Rejected,
}

impl From<MatchStatus> for InterestRowStatus {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Pending => InterestRowStatus::Pending,
            MatchStatus::Accepted => InterestRowStatus::Accepted,
            MatchStatus::Rejected => InterestRowStatus::Rejected,
        }
    }
}

impl From<InterestRowStatus> for MatchStatus {
    fn from(value: InterestRowStatus) -> Self {
        match value {
            InterestRowStatus::Pending => MatchStatus::Pending,
            InterestRowStatus::Accepted => MatchStatus::Accepted,
            InterestRowStatus::Rejected => MatchStatus::Rejected,
        }
    }
}

fn approval_str(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "pending",
        ApprovalStatus::Approved => "approved",
        ApprovalStatus::Rejected => "rejected",
    }
}

/// Profile store plus interest and decline history.
///
/// Each profile is kept as a JSONB document alongside the columns the
/// candidate query filters on. The boost columns are authoritative: they are
/// written in place by [`PostgresClient::activate_referral_boost`] without
/// rewriting the document, and overlaid onto it on every read.
pub struct PostgresClient {
    pool: PgPool,
}

const PROFILE_COLUMNS: &str =
    "profile, referral_count, referral_boost_start, engagement_boost_start";

impl PostgresClient {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn from_settings(
        settings: &crate::config::DatabaseSettings,
    ) -> Result<Self, PostgresError> {
        let client = Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await?;

        if settings.run_migrations {
            client.migrate().await?;
        }
        Ok(client)
    }

    pub async fn migrate(&self) -> Result<(), PostgresError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    fn profile_from_row(row: &PgRow) -> Result<Profile, PostgresError> {
        let Json(mut profile): Json<Profile> = row.try_get("profile")?;
        let referral_count: i32 = row.try_get("referral_count")?;
        profile.referral_count = referral_count.max(0) as u32;
        profile.referral_boost_start = row.try_get("referral_boost_start")?;
        profile.engagement_boost_start = row.try_get("engagement_boost_start")?;
        Ok(profile)
    }

    pub async fn fetch_profile(&self, user_id: &str) -> Result<Profile, PostgresError> {
        let query = format!("SELECT {} FROM profiles WHERE user_id = $1", PROFILE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("profile for user {}", user_id)))?;

        Self::profile_from_row(&row)
    }

    /// Coarse candidate pool for a seeker: visible profiles of another gender.
    ///
    /// The matcher still runs its own pool filter; this only keeps the row
    /// count down. Rows whose document fails to decode are skipped.
    pub async fn fetch_candidate_pool(
        &self,
        seeker: &Profile,
        max_candidates: i64,
    ) -> Result<Vec<Profile>, PostgresError> {
        let query = format!(
            r#"
            SELECT {}
            FROM profiles
            WHERE approval_status = 'approved'
              AND is_active
              AND NOT is_suspended
              AND user_id <> $1
              AND lower(gender) <> lower($2)
            ORDER BY updated_at DESC
            LIMIT $3
            "#,
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(&seeker.user_id)
            .bind(&seeker.gender)
            .bind(max_candidates)
            .fetch_all(&self.pool)
            .await?;

        let profiles: Vec<Profile> = rows
            .iter()
            .filter_map(|row| match Self::profile_from_row(row) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping undecodable candidate row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Fetched {} candidates for {} ({} rows)",
            profiles.len(),
            seeker.user_id,
            rows.len()
        );
        Ok(profiles)
    }

    /// Every interest and decline edge touching `user_id`, in either direction
    pub async fn fetch_interactions(&self, user_id: &str) -> Result<InteractionHistory, PostgresError> {
        let match_rows = sqlx::query(
            r#"
            SELECT sender_id, receiver_id, status
            FROM interests
            WHERE sender_id = $1 OR receiver_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let decline_rows = sqlx::query(
            r#"
            SELECT user_id, declined_user_id
            FROM declined_profiles
            WHERE user_id = $1 OR declined_user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let matches = match_rows
            .iter()
            .map(|row| {
                Ok(MatchRecord {
                    sender_id: row.try_get("sender_id")?,
                    receiver_id: row.try_get("receiver_id")?,
                    status: row.try_get::<InterestRowStatus, _>("status")?.into(),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let declines = decline_rows
            .iter()
            .map(|row| {
                Ok(DeclinedProfile {
                    user_id: row.try_get("user_id")?,
                    declined_user_id: row.try_get("declined_user_id")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(InteractionHistory::new(matches, declines))
    }

    /// Record a pending interest from `sender_id` to `receiver_id`.
    ///
    /// Re-sending is a no-op that keeps the existing row and its status.
    pub async fn record_interest(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<Uuid, PostgresError> {
        if sender_id == receiver_id {
            return Err(PostgresError::InvalidInput(
                "cannot express interest in yourself".to_string(),
            ));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO interests (id, sender_id, receiver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'pending', NOW(), NOW())
            ON CONFLICT (sender_id, receiver_id)
            DO UPDATE SET updated_at = interests.updated_at
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Recorded interest: {} -> {}", sender_id, receiver_id);
        Ok(row.try_get("id")?)
    }

    /// Accept or reject a pending interest addressed to `receiver_id`
    pub async fn respond_to_interest(
        &self,
        sender_id: &str,
        receiver_id: &str,
        status: MatchStatus,
    ) -> Result<(), PostgresError> {
        if status == MatchStatus::Pending {
            return Err(PostgresError::InvalidInput(
                "a response must accept or reject".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE interests
            SET status = $3, updated_at = NOW()
            WHERE sender_id = $1 AND receiver_id = $2 AND status = 'pending'
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(InterestRowStatus::from(status))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PostgresError::NotFound(format!(
                "pending interest {} -> {}",
                sender_id, receiver_id
            )));
        }

        tracing::debug!("Interest {} -> {} is now {:?}", sender_id, receiver_id, status);
        Ok(())
    }

    pub async fn record_decline(
        &self,
        user_id: &str,
        declined_user_id: &str,
    ) -> Result<(), PostgresError> {
        sqlx::query(
            r#"
            INSERT INTO declined_profiles (user_id, declined_user_id, declined_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, declined_user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(declined_user_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Recorded decline: {} -> {}", user_id, declined_user_id);
        Ok(())
    }

    /// Start a referral boost unless one was ever started.
    ///
    /// Returns whether this call performed the write, so concurrent rankings
    /// that both observed the milestone leave the earliest start in place.
    pub async fn activate_referral_boost(
        &self,
        profile_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<bool, PostgresError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET referral_boost_start = $2
            WHERE id = $1 AND referral_boost_start IS NULL
            "#,
        )
        .bind(profile_id)
        .bind(started_at)
        .execute(&self.pool)
        .await?;

        let activated = result.rows_affected() > 0;
        if activated {
            tracing::info!("Referral boost activated for profile {}", profile_id);
        }
        Ok(activated)
    }

    /// Insert or replace a profile document and its indexed columns.
    ///
    /// An existing referral boost start is never cleared by a save.
    pub async fn save_profile(&self, profile: &Profile) -> Result<(), PostgresError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, user_id, gender, approval_status, is_active, is_suspended,
                referral_count, referral_boost_start, engagement_boost_start,
                profile, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                gender = EXCLUDED.gender,
                approval_status = EXCLUDED.approval_status,
                is_active = EXCLUDED.is_active,
                is_suspended = EXCLUDED.is_suspended,
                referral_count = EXCLUDED.referral_count,
                referral_boost_start = COALESCE(profiles.referral_boost_start, EXCLUDED.referral_boost_start),
                engagement_boost_start = EXCLUDED.engagement_boost_start,
                profile = EXCLUDED.profile,
                updated_at = NOW()
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.user_id)
        .bind(&profile.gender)
        .bind(approval_str(profile.approval_status))
        .bind(profile.is_active)
        .bind(profile.is_suspended)
        .bind(profile.referral_count.min(i32::MAX as u32) as i32)
        .bind(profile.referral_boost_start)
        .bind(profile.engagement_boost_start)
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;

        tracing::debug!("Saved profile {} ({})", profile.id, profile.user_id);
        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
