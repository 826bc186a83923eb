use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::ai::ExtractionStrategy;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Supabase Auth
    pub supabase_jwt_jwks_url: String,
    pub supabase_jwt_issuer: String,
    pub supabase_jwt_audience: String,
    pub jwks_cache_ttl_seconds: u64,

    // Model providers
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub mistral_api_key: String,
    pub mistral_model: String,
    pub mistral_base_url: String,
    pub ai_request_timeout: Option<Duration>,
    pub extraction_strategy: ExtractionStrategy,
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::parse(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = parsed_or("DATABASE_MAX_CONNECTIONS", 10);
        let run_migrations = parsed_or("RUN_MIGRATIONS", false);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Supabase Auth
        let supabase_jwt_jwks_url =
            env::var("SUPABASE_JWT_JWKS_URL").context("SUPABASE_JWT_JWKS_URL must be set")?;
        let supabase_jwt_issuer =
            env::var("SUPABASE_JWT_ISSUER").context("SUPABASE_JWT_ISSUER must be set")?;
        let supabase_jwt_audience =
            env::var("SUPABASE_JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());
        let jwks_cache_ttl_seconds = parsed_or("JWKS_CACHE_TTL_SECONDS", 1800); // 30 minutes

        // Model providers
        let gemini_api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
        let gemini_model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string());
        let gemini_base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());
        let mistral_api_key =
            env::var("MISTRAL_API_KEY").context("MISTRAL_API_KEY must be set")?;
        let mistral_model =
            env::var("MISTRAL_MODEL").unwrap_or_else(|_| "mistral-large-latest".to_string());
        let mistral_base_url =
            env::var("MISTRAL_BASE_URL").unwrap_or_else(|_| DEFAULT_MISTRAL_BASE_URL.to_string());

        // Unset means model calls are never cut short
        let ai_request_timeout = match env::var("AI_REQUEST_TIMEOUT_SECONDS") {
            Ok(raw) => Some(Duration::from_secs(
                raw.parse::<u64>()
                    .context("AI_REQUEST_TIMEOUT_SECONDS must be a number of seconds")?,
            )),
            Err(_) => None,
        };
        let extraction_strategy = match env::var("AI_EXTRACTION_STRATEGY") {
            Ok(raw) => raw
                .parse::<ExtractionStrategy>()
                .map_err(anyhow::Error::msg)
                .context("AI_EXTRACTION_STRATEGY must be 'outer' or 'balanced'")?,
            Err(_) => ExtractionStrategy::default(),
        };

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            run_migrations,
            cors_allow_origins,
            supabase_jwt_jwks_url,
            supabase_jwt_issuer,
            supabase_jwt_audience,
            jwks_cache_ttl_seconds,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            mistral_api_key,
            mistral_model,
            mistral_base_url,
            ai_request_timeout,
            extraction_strategy,
        })
    }
}

#[cfg(test)]
impl Settings {
    /// Settings for in-process tests; nothing here is contacted.
    pub fn for_tests() -> Self {
        Self {
            env: Environment::Dev,
            server_addr: "127.0.0.1:0".to_string(),
            database_url: "postgres://localhost/test".to_string(),
            database_max_connections: 1,
            run_migrations: false,
            cors_allow_origins: vec!["http://localhost:3000".to_string()],
            supabase_jwt_jwks_url: "http://127.0.0.1:9/jwks".to_string(),
            supabase_jwt_issuer: "test".to_string(),
            supabase_jwt_audience: "authenticated".to_string(),
            jwks_cache_ttl_seconds: 60,
            gemini_api_key: "test".to_string(),
            gemini_model: "gemini-pro".to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            mistral_api_key: "test".to_string(),
            mistral_model: "mistral-large-latest".to_string(),
            mistral_base_url: DEFAULT_MISTRAL_BASE_URL.to_string(),
            ai_request_timeout: None,
            extraction_strategy: ExtractionStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names() {
        assert_eq!(Environment::parse("production"), Environment::Prod);
        assert_eq!(Environment::parse("STAGING"), Environment::Staging);
        assert_eq!(Environment::parse("anything"), Environment::Dev);
    }
}
