use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller identity attached to a request after the authorizer allowed it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject claim of the verified token; owns the caller's equipment
    pub sub: String,
}
