/// User schemas
///
/// Field rules shared by every shape that carries them:
///
/// - `first_name`, `last_name`: 2 to 30 characters
/// - `username`: 2 to 20 characters, lowercase letters and digits only
/// - `email`: a syntactically valid address of at most 50 characters
/// - `profile_image_url`: an http, https or ftp URL of at most 255 characters
///
/// # Example
///
/// ```
/// use clubhouse_shared::schemas::user::UserCreate;
/// use validator::Validate;
///
/// let user: UserCreate = serde_json::from_str(r#"{
///     "first_name": "User",
///     "last_name": "Userson",
///     "username": "userson",
///     "email": "user.userson@example.com",
///     "password": "Yash7150"
/// }"#).unwrap();
///
/// assert!(user.validate().is_ok());
/// ```

use crate::models::user::{User, UserRole};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+$").expect("username pattern is valid"));

static PROFILE_IMAGE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").expect("url pattern is valid")
});

/// Default avatar assigned at signup
pub const DEFAULT_PROFILE_IMAGE_URL: &str = "https://www.profileimageurl.com";

/// Signup payload
#[derive(Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 2, max = 30, message = "First name must be 2 to 30 characters"))]
    pub first_name: String,

    #[validate(length(min = 2, max = 30, message = "Last name must be 2 to 30 characters"))]
    pub last_name: String,

    #[validate(
        length(min = 2, max = 20, message = "Username must be 2 to 20 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain lowercase letters and digits"
        )
    )]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 50, message = "Email must be at most 50 characters")
    )]
    pub email: String,

    /// Plaintext password, hashed before anything is persisted
    #[validate(length(min = 1, max = 128, message = "Password must be 1 to 128 characters"))]
    pub password: String,

    /// Organization to join at signup, if any
    #[serde(default)]
    pub organization_id: Option<i64>,
}

impl fmt::Debug for UserCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCreate")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

impl UserCreate {
    /// Replaces the plaintext password with its hash
    ///
    /// The returned record is what gets inserted. New accounts start as
    /// players.
    pub fn into_internal(self, hashed_password: String) -> UserCreateInternal {
        UserCreateInternal {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            hashed_password,
            role: UserRole::Player,
            organization_id: self.organization_id,
        }
    }
}

/// Insert record built from [`UserCreate`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreateInternal {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub role: UserRole,
    pub organization_id: Option<i64>,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRead {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub profile_image_url: String,
    pub role: UserRole,
    pub organization_id: Option<i64>,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            profile_image_url: user.profile_image_url,
            role: user.role,
            organization_id: user.organization_id,
        }
    }
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 2, max = 30, message = "First name must be 2 to 30 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 2, max = 30, message = "Last name must be 2 to 30 characters"))]
    pub last_name: Option<String>,

    #[validate(
        length(min = 2, max = 20, message = "Username must be 2 to 20 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain lowercase letters and digits"
        )
    )]
    pub username: Option<String>,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 50, message = "Email must be at most 50 characters")
    )]
    pub email: Option<String>,

    #[validate(
        regex(path = *PROFILE_IMAGE_URL_REGEX, message = "Invalid profile image URL"),
        length(max = 255, message = "Profile image URL must be at most 255 characters")
    )]
    pub profile_image_url: Option<String>,
}

impl UserUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.profile_image_url.is_none()
    }
}

/// Moves a user to another organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct UserTierUpdate {
    #[validate(range(min = 1, message = "Organization id must be positive"))]
    pub organization_id: i64,
}

/// Soft-delete marker returned by [`User::soft_delete`]
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserDelete {
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Restore marker returned by [`User::restore`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRestoreDeleted {
    pub is_deleted: bool,
}
