use axum::Json;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::RequireAuth;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Value,
}

/// Get current authenticated user info
pub async fn get_profile(auth: RequireAuth) -> Json<ProfileResponse> {
    let RequireAuth(ctx) = auth;
    Json(ProfileResponse {
        user: UserProfile {
            id: ctx.user_id,
            email: ctx.email,
            role: ctx.role,
            metadata: ctx.metadata,
        },
    })
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{Harness, TOKEN};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn missing_token_is_401_and_bad_token_is_403() {
        let harness = Harness::offline();

        let (status, body) = harness.send("GET", "/api/auth/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, body) = harness
            .send("GET", "/api/auth/profile", Some("forged"), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn returns_the_token_identity() {
        let harness = Harness::offline();
        let (status, body) = harness
            .send("GET", "/api/auth/profile", Some(TOKEN), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], harness.user_id.to_string());
        assert_eq!(body["user"]["metadata"]["full_name"], "Test Maker");
    }
}
