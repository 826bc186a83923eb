//! JWKS-backed verification of Supabase access tokens

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Claims, TokenVerifier};

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Only RSA keys are used; other key types have no `n`/`e`.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    cached_at: Instant,
}

#[derive(Default)]
struct KeySet {
    keys: HashMap<String, CachedKey>,
    last_fetch: Option<Instant>,
}

/// Caches signing keys by `kid` and refreshes them when stale or unknown.
#[derive(Clone)]
pub struct JwksCache {
    inner: Arc<RwLock<KeySet>>,
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwksCache {
    pub fn new(
        http: reqwest::Client,
        jwks_url: String,
        issuer: String,
        audience: String,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(KeySet::default())),
            http,
            jwks_url,
            issuer,
            audience,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Verify an RS256 token against the issuer and audience.
    pub async fn verify_token(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).context("Invalid JWT header")?;
        let kid = header.kid.context("JWT missing kid header")?;

        let decoding_key = self.get_or_fetch_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).context("JWT validation failed")?;

        Ok(token_data.claims)
    }

    async fn get_or_fetch_key(&self, kid: &str) -> Result<DecodingKey> {
        if let Some(key) = self.cached(kid) {
            return Ok(key);
        }

        self.refresh_keys().await?;

        // A throttled refresh leaves stale keys in place; they must not verify
        self.cached(kid).context("Key not found in JWKS")
    }

    fn cached(&self, kid: &str) -> Option<DecodingKey> {
        let set = self.inner.read();
        set.keys
            .get(kid)
            .filter(|cached| cached.cached_at.elapsed() < self.ttl)
            .map(|cached| cached.key.clone())
    }

    async fn refresh_keys(&self) -> Result<()> {
        // At most one fetch per second
        let last_fetch = self.inner.read().last_fetch;
        if let Some(last) = last_fetch {
            if last.elapsed() < Duration::from_secs(1) {
                return Ok(());
            }
        }

        tracing::debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .http
            .get(&self.jwks_url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .context("Failed to fetch JWKS")?;

        if !response.status().is_success() {
            anyhow::bail!("JWKS fetch failed with status: {}", response.status());
        }

        let jwks: JwksResponse = response.json().await.context("Failed to parse JWKS")?;
        let count = self.install(jwks);

        tracing::info!(keys = count, "JWKS cache refreshed");
        Ok(())
    }

    /// Replace the cached keys with the RSA keys of a fetched set.
    ///
    /// Keys missing from the set are dropped, so rotated-out keys stop
    /// verifying. Returns how many keys are cached.
    fn install(&self, jwks: JwksResponse) -> usize {
        let now = Instant::now();
        let mut keys = HashMap::with_capacity(jwks.keys.len());

        for jwk in jwks.keys {
            let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
                continue;
            };
            if jwk.kty != "RSA" {
                continue;
            }

            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    keys.insert(jwk.kid, CachedKey { key, cached_at: now });
                }
                Err(err) => tracing::warn!(kid = %jwk.kid, error = %err, "Failed to parse JWK"),
            }
        }

        let mut set = self.inner.write();
        set.last_fetch = Some(now);
        set.keys = keys;
        set.keys.len()
    }

    /// Pre-warm the cache by fetching keys
    pub async fn warm_cache(&self) -> Result<()> {
        self.refresh_keys().await
    }
}

#[async_trait]
impl TokenVerifier for JwksCache {
    async fn verify(&self, token: &str) -> Result<Claims> {
        self.verify_token(token).await
    }
}
