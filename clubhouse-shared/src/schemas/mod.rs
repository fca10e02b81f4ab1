/// Request and response shapes
///
/// Request schemas derive [`validator::Validate`] so malformed input is
/// rejected before a handler touches the database. Response schemas never
/// carry password material.
///
/// - `user`: signup, read, partial update and soft-delete shapes
/// - `organization`: organization create/read/update/delete shapes

use serde::{Deserialize, Serialize};

pub mod organization;
pub mod user;

/// Plain `{"message": "..."}` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
