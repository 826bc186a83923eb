pub mod claims;
pub mod context;
pub mod jwks;
pub mod middleware;

use anyhow::Result;
use async_trait::async_trait;

pub use claims::Claims;
pub use context::AuthContext;
pub use jwks::JwksCache;
pub use middleware::{OptionalAuth, RequireAuth};

/// Checks a bearer token and returns its claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims>;
}
