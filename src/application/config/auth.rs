use std::env;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret shared with whatever issues the tokens
    pub jwt_secret: String,
    /// Lifetime of tokens minted by `issue_token`, in seconds
    pub access_token_ttl: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("LABTRACK_JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("LABTRACK_JWT_SECRET not set, using development secret");
                "labtrack-dev-secret-change-me".to_string()
            }),
            access_token_ttl: env::var("LABTRACK_ACCESS_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        }
    }
}
