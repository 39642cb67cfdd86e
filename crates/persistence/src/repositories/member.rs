//! Member repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{CreateMemberRequest, UpdateSubscriptionRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MemberEntity, MembershipLevelDb};
use crate::metrics::QueryTimer;

const MEMBER_COLUMNS: &str = "id, name, email, membership_level, subscription_end_date, \
     renewal_reminder_date, is_active, created_at, updated_at";

/// Repository for member-related database operations.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Creates a new MemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new member.
    pub async fn create(&self, request: &CreateMemberRequest) -> Result<MemberEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_member");
        let level: MembershipLevelDb = request.membership_level.into();
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            INSERT INTO members (name, email, membership_level, subscription_end_date, renewal_reminder_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(level)
        .bind(request.subscription_end_date)
        .bind(request.renewal_reminder_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a member by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_id");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Partially update a member's subscription fields.
    ///
    /// Absent fields keep their stored value.
    pub async fn update_subscription(
        &self,
        id: Uuid,
        request: &UpdateSubscriptionRequest,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_member_subscription");
        let level: Option<MembershipLevelDb> = request.membership_level.map(Into::into);
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            UPDATE members SET
                membership_level = COALESCE($2, membership_level),
                subscription_end_date = COALESCE($3, subscription_end_date),
                renewal_reminder_date = COALESCE($4, renewal_reminder_date),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(level)
        .bind(request.subscription_end_date)
        .bind(request.renewal_reminder_date)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active members with an end or reminder date before `horizon`.
    ///
    /// Past dates are included so that expired subscriptions keep alerting.
    pub async fn find_alert_candidates(
        &self,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_alert_candidates");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM members
            WHERE is_active = true
              AND (subscription_end_date <= $1 OR renewal_reminder_date <= $1)
            ORDER BY id
            "#
        ))
        .bind(horizon)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
