//! Reward catalog and redemption handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::reward::{
    ListRewardsQuery, ListRewardsResponse, RedeemRewardRequest, RedeemRewardResponse,
};
use domain::models::{CreateRewardRequest, RewardResponse, UpdateRewardRequest};
use persistence::repositories::RewardRepository;
use persistence::RepositoryError;
use shared::validation::{validate_stock, validate_valid_until};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_redemption;
use crate::routes::loyalty::refresh_stats;

fn reward_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Reward {} not found", id))
}

/// GET /api/v1/rewards
pub async fn list_rewards(
    State(state): State<AppState>,
    Query(query): Query<ListRewardsQuery>,
) -> Result<Json<ListRewardsResponse>, ApiError> {
    let now = Utc::now();
    let repo = RewardRepository::new(state.pool.clone());
    let rewards: Vec<RewardResponse> = repo
        .list(query.category, query.available_only, now)
        .await?
        .into_iter()
        .map(|row| RewardResponse::at(row.into(), now))
        .collect();

    Ok(Json(ListRewardsResponse {
        total: rewards.len(),
        rewards,
    }))
}

/// POST /api/v1/rewards
pub async fn create_reward(
    State(state): State<AppState>,
    Json(request): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<RewardResponse>), ApiError> {
    request.validate()?;
    validate_stock(request.stock)?;
    if let Some(valid_until) = &request.valid_until {
        validate_valid_until(valid_until)?;
    }

    let repo = RewardRepository::new(state.pool.clone());
    let reward = repo.create(&request).await?;

    info!(
        reward_id = %reward.id,
        name = %reward.name,
        points_required = reward.points_required,
        stock = reward.stock,
        "Reward created"
    );

    Ok((
        StatusCode::CREATED,
        Json(RewardResponse::at(reward.into(), Utc::now())),
    ))
}

/// GET /api/v1/rewards/:reward_id
pub async fn get_reward(
    State(state): State<AppState>,
    Path(reward_id): Path<Uuid>,
) -> Result<Json<RewardResponse>, ApiError> {
    let repo = RewardRepository::new(state.pool.clone());
    let reward = repo
        .find_by_id(reward_id)
        .await?
        .ok_or_else(|| reward_not_found(reward_id))?;

    Ok(Json(RewardResponse::at(reward.into(), Utc::now())))
}

/// Partial update; absent fields keep their stored value.
///
/// PATCH /api/v1/rewards/:reward_id
pub async fn update_reward(
    State(state): State<AppState>,
    Path(reward_id): Path<Uuid>,
    Json(request): Json<UpdateRewardRequest>,
) -> Result<Json<RewardResponse>, ApiError> {
    request.validate()?;
    if let Some(stock) = request.stock {
        validate_stock(stock)?;
    }
    if let Some(valid_until) = &request.valid_until {
        validate_valid_until(valid_until)?;
    }

    let repo = RewardRepository::new(state.pool.clone());
    let reward = repo
        .update(reward_id, &request)
        .await?
        .ok_or_else(|| reward_not_found(reward_id))?;

    info!(reward_id = %reward_id, "Reward updated");

    Ok(Json(RewardResponse::at(reward.into(), Utc::now())))
}

/// Spend points on a reward.
///
/// POST /api/v1/rewards/:reward_id/redeem
pub async fn redeem_reward(
    State(state): State<AppState>,
    Path(reward_id): Path<Uuid>,
    Json(request): Json<RedeemRewardRequest>,
) -> Result<(StatusCode, Json<RedeemRewardResponse>), ApiError> {
    let now = Utc::now();
    let repo = RewardRepository::new(state.pool.clone());

    let redemption = match repo.redeem(reward_id, request.user_id, now).await {
        Ok(redemption) => redemption,
        Err(e) => {
            if matches!(e, RepositoryError::Redemption(_) | RepositoryError::Ledger(_)) {
                record_redemption(false);
            }
            return Err(e.into());
        }
    };
    record_redemption(true);

    refresh_stats(&state, request.user_id).await;

    Ok((
        StatusCode::CREATED,
        Json(RedeemRewardResponse {
            entry: redemption.entry.into(),
            reward: RewardResponse::at(redemption.reward.into(), now),
        }),
    ))
}
