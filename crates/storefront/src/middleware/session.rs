//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session is
//! what ties a visitor to their cart across otherwise stateless requests.
//! The session cookie is signed with a key taken from the configured session
//! secret, so a tampered or forged session id is ignored.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::{Key, KeyError};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "minishop_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session store. The `tower_sessions.session` table is created by
/// the storefront migrations.
#[must_use]
pub fn create_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

/// Session layer type used by the storefront.
pub type StorefrontSessionLayer<Store = PostgresStore> = SessionManagerLayer<Store, SignedCookie>;

/// Create the session layer around a session store.
///
/// Sessions expire after 7 days without activity, so an abandoned cart goes
/// with them.
///
/// # Errors
///
/// Returns `KeyError::TooShort` if the session secret is shorter than the
/// 64 bytes a signing key is derived from.
pub fn create_session_layer<Store: SessionStore>(
    store: Store,
    config: &StorefrontConfig,
) -> Result<StorefrontSessionLayer<Store>, KeyError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::IpAddr;

    use axum::{
        Router,
        body::Body,
        extract::Request,
        http::header,
        routing::get,
    };
    use secrecy::SecretString;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use super::*;
    use crate::config::SentryConfig;

    const SIGNING_SECRET: &str =
        "Qm7#vR2!xK9@pL4$wN8^tJ3&zH6*cF1(bD5)gS0_yA7+eU2=iO9~rT4<nM8>kW3%";

    fn config(secret: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/minishop".to_owned()),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            session_secret: SecretString::from(secret.to_owned()),
            sentry: SentryConfig::default(),
        }
    }

    fn app() -> Router {
        let layer = create_session_layer(MemoryStore::default(), &config(SIGNING_SECRET)).unwrap();
        Router::new()
            .route(
                "/",
                get(|session: Session| async move {
                    let visits: usize = session.get("visits").await.unwrap().unwrap_or(0) + 1;
                    session.insert("visits", visits).await.unwrap();
                    visits.to_string()
                }),
            )
            .layer(layer)
    }

    async fn visit(app: &Router, cookie: Option<&str>) -> (String, Option<String>) {
        let mut request = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().split(';').next().unwrap().to_owned());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (String::from_utf8(body.to_vec()).unwrap(), set_cookie)
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = create_session_layer(MemoryStore::default(), &config(&"k".repeat(63)));
        assert!(matches!(result, Err(KeyError::TooShort(63))));
    }

    #[tokio::test]
    async fn test_signed_cookie_resumes_session() {
        let app = app();
        let (first, cookie) = visit(&app, None).await;
        let cookie = cookie.unwrap();
        assert_eq!(first, "1");
        assert!(cookie.starts_with(SESSION_COOKIE_NAME));

        let (second, _) = visit(&app, Some(&cookie)).await;
        assert_eq!(second, "2");
    }

    #[tokio::test]
    async fn test_tampered_cookie_starts_fresh_session() {
        let app = app();
        let (_, cookie) = visit(&app, None).await;
        let cookie = cookie.unwrap();

        let (name, value) = cookie.split_once('=').unwrap();
        let replacement = if value.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{name}={replacement}{}", value.get(1..).unwrap());

        let (visits, _) = visit(&app, Some(&tampered)).await;
        assert_eq!(visits, "1");
    }
}
