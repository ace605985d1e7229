use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::UserRecord;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub clerk_user_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRecord {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            clerk_user_id: self.clerk_user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}
