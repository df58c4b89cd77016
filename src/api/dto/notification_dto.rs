//! Notification DTOs.

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

/// Request body for `PATCH /api/notifications/mark-read-all`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MarkReadAllRequest {
    /// Notifications to mark read.
    #[serde(default)]
    pub ids: Option<Vec<Uuid>>,
}

impl MarkReadAllRequest {
    /// The ids to mark.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when the array is missing.
    pub fn ids(&self) -> Result<&[Uuid], ApiError> {
        self.ids
            .as_deref()
            .ok_or_else(|| ApiError::invalid("ids array is required"))
    }
}
