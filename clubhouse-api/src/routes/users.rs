/// User endpoints
///
/// - `POST /signup` - Create an account
/// - `POST /login` - Placeholder
/// - `GET /users/:username` - Read a user
/// - `PATCH /users/:username` - Partial update
/// - `PATCH /users/:username/organization` - Move to another organization
/// - `DELETE /users/:username` - Soft delete
///
/// Request bodies arrive through [`ValidatedJson`], so every handler here
/// sees payloads that already passed their field rules.

use crate::{
    app::AppState,
    error::{is_integrity_violation, ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use clubhouse_shared::{
    auth::password,
    models::{organization::Organization, user::User},
    schemas::{
        user::{UserCreate, UserRead, UserTierUpdate, UserUpdate},
        MessageResponse,
    },
};

pub const EMAIL_TAKEN_MESSAGE: &str = "Email is already registered";
pub const USERNAME_TAKEN_MESSAGE: &str = "Username not available";
pub const LOGIN_PLACEHOLDER_MESSAGE: &str = "Login endpoint not implemented yet";

/// Creates a user account
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// {
///   "first_name": "User",
///   "last_name": "Userson",
///   "username": "userson",
///   "email": "user.userson@example.com",
///   "password": "Yash7150"
/// }
/// ```
///
/// The duplicate checks and the insert share one transaction. The checks
/// give friendly messages; the partial unique indexes are what actually
/// guarantee uniqueness, so a concurrent signup that passes the checks
/// still fails at insert or commit.
///
/// # Errors
///
/// - `400 Bad Request`: email or username taken, unknown organization, or
///   a constraint violation at insert/commit
/// - `422 Unprocessable Entity`: validation failed
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserCreate>,
) -> ApiResult<(StatusCode, Json<UserRead>)> {
    let mut tx = state.db.begin().await?;

    if User::find_by_email(&mut *tx, &payload.email).await?.is_some() {
        tracing::debug!(email = %payload.email, "Signup rejected: email taken");
        return Err(ApiError::BadRequest(EMAIL_TAKEN_MESSAGE.to_string()));
    }

    if User::find_by_username(&mut *tx, &payload.username)
        .await?
        .is_some()
    {
        tracing::debug!(username = %payload.username, "Signup rejected: username taken");
        return Err(ApiError::BadRequest(USERNAME_TAKEN_MESSAGE.to_string()));
    }

    if let Some(organization_id) = payload.organization_id {
        if Organization::find_by_id(&mut *tx, organization_id)
            .await?
            .is_none()
        {
            tracing::debug!(organization_id, "Signup rejected: unknown organization");
            return Err(ApiError::integrity());
        }
    }

    let hashed_password = password::hash_password(&payload.password)?;
    let internal = payload.into_internal(hashed_password);

    let user = match User::create(&mut *tx, internal).await {
        Ok(user) => user,
        Err(e) => {
            if is_integrity_violation(&e) {
                tracing::info!(error = %e, "Signup lost a uniqueness race");
            }
            tx.rollback().await?;
            return Err(e.into());
        }
    };

    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    Ok((StatusCode::CREATED, Json(UserRead::from(user))))
}

/// Login placeholder; ignores the request body
pub async fn login() -> Json<MessageResponse> {
    Json(MessageResponse::new(LOGIN_PLACEHOLDER_MESSAGE))
}

async fn live_user(state: &AppState, username: &str) -> ApiResult<User> {
    User::find_by_username(&state.db, username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserRead>> {
    let user = live_user(&state, &username).await?;
    Ok(Json(user.into()))
}

/// Partial update; a taken email or username is a 400
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ValidatedJson(payload): ValidatedJson<UserUpdate>,
) -> ApiResult<Json<UserRead>> {
    let user = live_user(&state, &username).await?;

    if payload.is_empty() {
        return Ok(Json(user.into()));
    }

    let updated = User::update(&state.db, user.id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = updated.id, "User updated");
    Ok(Json(updated.into()))
}

pub async fn update_user_tier(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ValidatedJson(payload): ValidatedJson<UserTierUpdate>,
) -> ApiResult<Json<UserRead>> {
    let user = live_user(&state, &username).await?;

    if Organization::find_by_id(&state.db, payload.organization_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Organization not found".to_string()));
    }

    let updated = User::set_organization(&state.db, user.id, payload.organization_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        user_id = updated.id,
        organization_id = payload.organization_id,
        "User moved to organization"
    );
    Ok(Json(updated.into()))
}

/// Soft delete; frees the email and username for new signups
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let user = live_user(&state, &username).await?;

    User::soft_delete(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = user.id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}
