use serde::{Deserialize, Serialize};
use time::Duration;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::auth::repo_types::User;
use crate::config::AppConfig;
use crate::error::ApiError;

/// Session key under which the authenticated user's payload is stored.
pub const SESSION_USER_KEY: &str = "user";

pub const SESSION_COOKIE_NAME: &str = "sid";

const SESSION_TTL: Duration = Duration::hours(2);

/// Payload written into the session on successful login. Trusted for the
/// session's lifetime; the Credential Store is not consulted again until the
/// next login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Read the authenticated user out of the current session, if any.
pub async fn current_user(session: &Session) -> Result<Option<SessionUser>, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::Internal(e.into()))
}

/// Cookie-session middleware: signed `sid` cookie, HttpOnly, SameSite=Lax,
/// two-hour sliding expiry. The in-process store mirrors the Session Manager
/// interface (`load`/`save`/`delete`), so a durable store can be swapped in
/// without touching the handlers.
pub fn session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let store = MemoryStore::default();
    // Config validation guarantees at least 32 bytes of key material, the
    // minimum `derive_from` accepts.
    let key = Key::derive_from(config.session.secret.as_bytes());
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.session.cookie_secure)
        .with_expiry(Expiry::OnInactivity(SESSION_TTL))
        .with_signed(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    #[test]
    fn session_layer_builds_from_minimum_length_secret() {
        let config = AppConfig {
            database_url: "postgres://localhost/loginbox".into(),
            host: "127.0.0.1".into(),
            port: 0,
            session: SessionConfig {
                // exactly the 32-byte minimum enforced by AppConfig::from_env
                secret: "0123456789abcdef0123456789abcdef".into(),
                cookie_secure: false,
            },
        };
        let _layer = session_layer(&config);
    }

    #[test]
    fn session_user_serializes_public_fields() {
        let payload = SessionUser {
            id: 1,
            email: "a@x.com".into(),
            name: Some("Alice".into()),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["name"], "Alice");
    }

    #[test]
    fn session_user_from_user_drops_the_hash() {
        use time::macros::datetime;

        let user = User {
            id: 7,
            name: None,
            email: "b@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            is_active: true,
            last_login_at: None,
            created_at: datetime!(2024-01-01 00:00 UTC),
        };
        let payload = SessionUser::from(&user);
        assert_eq!(payload.id, 7);
        assert_eq!(payload.email, "b@x.com");
        assert_eq!(payload.name, None);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
