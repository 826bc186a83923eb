use serde_json::Value;
use uuid::Uuid;

use super::Claims;

/// Authenticated caller, built from verified token claims
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Value,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: claims.role.clone(),
            metadata: claims
                .user_metadata
                .clone()
                .unwrap_or_else(|| Value::Object(Default::default())),
        })
    }
}
