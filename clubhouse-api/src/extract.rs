/// Request extractors
///
/// [`ValidatedJson`] deserializes a JSON body and runs its `validator`
/// rules before the handler is called. Either failure is rejected with a
/// 422 [`ApiError::ValidationError`].
///
/// # Example
///
/// ```no_run
/// use clubhouse_api::extract::ValidatedJson;
/// use clubhouse_shared::schemas::user::UserCreate;
///
/// async fn signup(ValidatedJson(payload): ValidatedJson<UserCreate>) -> String {
///     format!("creating {}", payload.username)
/// }
/// ```

use crate::error::ApiError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has passed its field validation
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "JSON body rejected");
            ApiError::from(rejection)
        })?;

        value.validate().map_err(|errors| {
            tracing::debug!(fields = errors.field_errors().len(), "Request validation failed");
            ApiError::from(errors)
        })?;

        Ok(ValidatedJson(value))
    }
}
