//! Member endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateMemberRequest, Member, UpdateSubscriptionRequest};
use persistence::repositories::MemberRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

fn member_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Member {} not found", id))
}

/// Register a member.
///
/// POST /api/v1/members
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    request.validate()?;

    let repo = MemberRepository::new(state.pool.clone());
    let member: Member = repo.create(&request).await?.into();

    info!(
        member_id = %member.id,
        membership_level = %member.membership_level,
        "Member created"
    );

    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /api/v1/members/:user_id
pub async fn get_member(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Member>, ApiError> {
    let repo = MemberRepository::new(state.pool.clone());
    let member = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| member_not_found(user_id))?;

    Ok(Json(member.into()))
}

/// Change subscription dates, level or activity. The next poll picks the
/// change up.
///
/// PUT /api/v1/members/:user_id/subscription
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateSubscriptionRequest>,
) -> Result<Json<Member>, ApiError> {
    let repo = MemberRepository::new(state.pool.clone());
    let member: Member = repo
        .update_subscription(user_id, &request)
        .await?
        .ok_or_else(|| member_not_found(user_id))?
        .into();

    info!(
        member_id = %member.id,
        subscription_end_date = ?member.subscription_end_date,
        renewal_reminder_date = ?member.renewal_reminder_date,
        is_active = member.is_active,
        "Member subscription updated"
    );

    Ok(Json(member))
}
