use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::ApiError;
use crate::models::user::User;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

/// Identity carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: i64,
    pub phone: String,
    pub username: Option<String>,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Stateless HS256 session tokens. There is no revocation; a token is good
/// until `exp`.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: impl AsRef<[u8]>, lifetime: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            lifetime,
        }
    }

    fn mac(&self) -> Result<HmacSha256, ApiError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| eyre::eyre!("Invalid HMAC key: {e}").into())
    }

    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        self.issue_at(user, Utc::now().timestamp())
    }

    pub fn issue_at(&self, user: &User, now: i64) -> Result<String, ApiError> {
        let claims = SessionClaims {
            id: user.id,
            phone: user.phone.clone(),
            username: user.username.clone(),
            iat: now,
            exp: now + self.lifetime.as_secs() as i64,
        };
        let header = JwtHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };

        let header_json = serde_json::to_vec(&header).map_err(eyre::Report::from)?;
        let claims_json = serde_json::to_vec(&claims).map_err(eyre::Report::from)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, ApiError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Checks the signature and expiry. Every failure is `InvalidToken`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<SessionClaims, ApiError> {
        let mut parts = token.trim().split('.');
        let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ApiError::InvalidToken);
        };

        let header: JwtHeader = decode_json(header_b64)?;
        if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
            return Err(ApiError::InvalidToken);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| ApiError::InvalidToken)?;
        let mut mac = self.mac()?;
        mac.update(format!("{header_b64}.{claims_b64}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| ApiError::InvalidToken)?;

        let claims: SessionClaims = decode_json(claims_b64)?;
        if claims.exp <= now {
            return Err(ApiError::InvalidToken);
        }

        Ok(claims)
    }
}

fn decode_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, ApiError> {
    let raw = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| ApiError::InvalidToken)?;
    serde_json::from_slice(&raw).map_err(|_| ApiError::InvalidToken)
}
