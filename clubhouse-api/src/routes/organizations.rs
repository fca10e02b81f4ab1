/// Organization endpoints
///
/// - `POST /organizations`
/// - `GET /organizations?limit=&offset=`
/// - `GET /organizations/:id`
/// - `PATCH /organizations/:id`
/// - `DELETE /organizations/:id` (soft)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use clubhouse_shared::{
    models::organization::Organization,
    schemas::{
        organization::{OrganizationCreate, OrganizationRead, OrganizationUpdate},
        MessageResponse,
    },
};
use serde::Deserialize;

const MAX_PAGE_SIZE: i64 = 100;

/// Pagination parameters for listing
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

impl Pagination {
    /// Clamps to `1..=100` and a non-negative offset
    pub fn clamped(self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_PAGE_SIZE), self.offset.max(0))
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Organization not found".to_string())
}

pub async fn create_organization(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<OrganizationCreate>,
) -> ApiResult<(StatusCode, Json<OrganizationRead>)> {
    let org = Organization::create(&state.db, payload).await?;

    tracing::info!(organization_id = org.id, "Organization created");
    Ok((StatusCode::CREATED, Json(org.into())))
}

pub async fn list_organizations(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<OrganizationRead>>> {
    let (limit, offset) = pagination.clamped();
    let orgs = Organization::list(&state.db, limit, offset).await?;

    Ok(Json(orgs.into_iter().map(OrganizationRead::from).collect()))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrganizationRead>> {
    let org = Organization::find_by_id(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(org.into()))
}

pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<OrganizationUpdate>,
) -> ApiResult<Json<OrganizationRead>> {
    let org = Organization::update(&state.db, id, payload)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(organization_id = org.id, "Organization updated");
    Ok(Json(org.into()))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    Organization::soft_delete(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(organization_id = id, "Organization deleted");
    Ok(Json(MessageResponse::new("Organization deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamped() {
        let p = Pagination { limit: 0, offset: -5 };
        assert_eq!(p.clamped(), (1, 0));

        let p = Pagination { limit: 1000, offset: 20 };
        assert_eq!(p.clamped(), (100, 20));

        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.clamped(), (100, 0));
    }
}
