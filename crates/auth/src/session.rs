use chorely_config::SessionConfig;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Household role of a signed-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Parent,
    Child,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parent" => Some(Self::Parent),
            "child" => Some(Self::Child),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseTokens {
    pub id_token: String,
    pub refresh_token: String,
}

/// Identity carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub firebase: FirebaseTokens,
    /// Set on decode; ignored on encode.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to sign session token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
    firebase: FirebaseTokens,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens (HS256, zero clock leeway).
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> anyhow::Result<Self> {
        let secret = config.validate()?;
        let ttl = Duration::seconds(config.ttl_seconds.min(u64::from(u32::MAX)) as i64);
        Ok(Self::new(secret.as_bytes(), ttl))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn encode(&self, session: &Session) -> Result<String, SessionError> {
        self.encode_with_expiry(session, Utc::now() + self.ttl)
    }

    pub fn encode_with_expiry(
        &self,
        session: &Session,
        expires_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let claims = Claims {
            sub: session.uid.clone(),
            role: session.role,
            email: session.email.clone(),
            email_verified: session.email_verified,
            name: session.name.clone(),
            picture: session.picture.clone(),
            firebase: session.firebase.clone(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verifies `token`. Tampered, expired or malformed tokens are anonymous.
    pub fn decode(&self, token: &str) -> Option<Session> {
        let data = match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => data,
            Err(error) => {
                debug!(error = %error, "rejected session token");
                return None;
            }
        };

        let claims = data.claims;
        if claims.sub.is_empty() {
            debug!("rejected session token without subject");
            return None;
        }

        Some(Session {
            uid: claims.sub,
            role: claims.role,
            email: claims.email,
            email_verified: claims.email_verified,
            name: claims.name,
            picture: claims.picture,
            firebase: claims.firebase,
            expires_at: Utc.timestamp_opt(claims.exp, 0).single(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn session() -> Session {
        Session {
            uid: "uid-parent".into(),
            role: UserRole::Parent,
            email: Some("pat@example.com".into()),
            email_verified: true,
            name: Some("Pat".into()),
            picture: None,
            firebase: FirebaseTokens {
                id_token: "id-1".into(),
                refresh_token: "refresh-1".into(),
            },
            expires_at: None,
        }
    }

    fn codec() -> SessionCodec {
        SessionCodec::new(SECRET, Duration::hours(1))
    }

    #[test]
    fn valid_token_decodes_identity_and_tokens() {
        let codec = codec();
        let token = codec.encode(&session()).unwrap();

        let decoded = codec.decode(&token).expect("token should verify");
        assert_eq!(decoded.uid, "uid-parent");
        assert_eq!(decoded.email.as_deref(), Some("pat@example.com"));
        assert!(decoded.email_verified);
        assert_eq!(decoded.firebase.refresh_token, "refresh-1");
        assert!(decoded.expires_at.unwrap() > Utc::now());
    }

    #[test]
    fn tampered_signature_is_anonymous() {
        let codec = codec();
        let token = codec.encode(&session()).unwrap();

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let mut flipped: Vec<char> = signature.chars().collect();
        flipped[0] = if flipped[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{unsigned}.{}", flipped.into_iter().collect::<String>());

        assert!(codec.decode(&tampered).is_none());
    }

    #[test]
    fn tampered_payload_is_anonymous() {
        let codec = codec();
        let token = codec.encode(&session()).unwrap();
        let other = SessionCodec::new(SECRET, Duration::hours(1))
            .encode(&Session {
                uid: "uid-intruder".into(),
                ..session()
            })
            .unwrap();

        let header = token.split('.').next().unwrap();
        let payload = other.split('.').nth(1).unwrap();
        let signature = token.split('.').nth(2).unwrap();
        assert!(codec.decode(&format!("{header}.{payload}.{signature}")).is_none());
    }

    #[test]
    fn expired_token_is_anonymous() {
        let codec = codec();
        let token = codec
            .encode_with_expiry(&session(), Utc::now() - Duration::seconds(5))
            .unwrap();
        assert!(codec.decode(&token).is_none());
    }

    #[test]
    fn other_secret_and_garbage_are_anonymous() {
        let token = codec().encode(&session()).unwrap();
        let stranger = SessionCodec::new(b"another-secret-another-secret-!!", Duration::hours(1));
        assert!(stranger.decode(&token).is_none());
        assert!(codec().decode("").is_none());
        assert!(codec().decode("not.a.token").is_none());
    }

    #[test]
    fn from_config_rejects_short_secret() {
        let config = SessionConfig {
            secret: Some("short".into()),
            ..SessionConfig::default()
        };
        assert!(SessionCodec::from_config(&config).is_err());
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!(UserRole::parse(" Child "), Some(UserRole::Child));
        assert_eq!(UserRole::parse("admin"), None);
        assert_eq!(UserRole::Parent.as_str(), "parent");
    }
}
