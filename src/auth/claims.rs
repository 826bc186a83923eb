use serde::{Deserialize, Serialize};

/// Claims carried by a Supabase access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    pub aud: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,

    #[serde(default)]
    pub email: Option<String>,

    /// Supabase role, usually `authenticated`
    #[serde(default)]
    pub role: Option<String>,

    /// Profile fields set at signup (full name, sustainability preferences)
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
}
