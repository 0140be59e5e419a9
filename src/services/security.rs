use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::Result;

/// Caller roles known to the backend. Also stored on user accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "dean")]
    Dean,
    #[sea_orm(string_value = "itsd")]
    Itsd,
    #[sea_orm(string_value = "technician")]
    Technician,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Dean, Role::Itsd, Role::Technician];

    /// Case-insensitive parse of a role name
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dean => "dean",
            Role::Itsd => "itsd",
            Role::Technician => "technician",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Mint an access token. Login is handled elsewhere; this exists for
/// operators and tests.
pub fn issue_token(user_id: &str, email: Option<&str>, role: Role) -> Result<String> {
    issue_token_with_ttl(user_id, email, role, CONFIG.auth.access_token_ttl)
}

pub fn issue_token_with_ttl(
    user_id: &str,
    email: Option<&str>,
    role: Role,
    ttl_seconds: i64,
) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(String::from),
        role,
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
}

/// Decode and validate an access token
pub fn decode_token(token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // No clock skew tolerance for expiration check
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_round_trip_keeps_identity() {
        let token = issue_token("7", Some("tech@lab.edu"), Role::Technician).unwrap();
        let claims = decode_token(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email.as_deref(), Some("tech@lab.edu"));
        assert_eq!(claims.role, Role::Technician);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = issue_token_with_ttl("7", None, Role::Admin, -60).unwrap();
        assert!(matches!(decode_token(&token), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_role_parse_ignores_case() {
        assert_eq!(Role::parse(" ITSD "), Some(Role::Itsd));
        assert_eq!(Role::parse("technician"), Some(Role::Technician));
        assert_eq!(Role::parse("student"), None);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(decode_token("not.a.jwt").is_err());
    }
}
