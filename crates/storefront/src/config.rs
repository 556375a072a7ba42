//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session cookie signing secret (min 64 bytes, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g. `production`)
//! - `SENTRY_SAMPLE_RATE` - Fraction of errors sent to Sentry (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of transactions traced (default: 0.0)
//!
//! `LOG_FORMAT` and `RUST_LOG` are read by the binary when it sets up logging.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Secret the session cookie signing key is taken from
    pub session_secret: SecretString,
    /// Sentry error tracking settings
    pub sentry: SentryConfig,
}

/// Sentry settings. Tracking is disabled when no DSN is configured.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads a `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the session secret is too weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_source(&ProcessEnv)
    }

    fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let database_url = env
            .optional("STOREFRONT_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;

        let base_url = env.required("STOREFRONT_BASE_URL")?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_BASE_URL".to_string(),
                "must start with http:// or https://".to_string(),
            ));
        }

        let session_secret = env.required("STOREFRONT_SESSION_SECRET")?;
        SecretCheck::new("STOREFRONT_SESSION_SECRET").run(&session_secret)?;

        Ok(Self {
            database_url,
            host: env.parsed_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parsed_or("STOREFRONT_PORT", 3000)?,
            base_url,
            session_secret: SecretString::from(session_secret),
            sentry: SentryConfig::from_source(env)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (controls secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SentryConfig {
    fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.rate_or("SENTRY_SAMPLE_RATE", defaults.sample_rate)?,
            traces_sample_rate: env
                .rate_or("SENTRY_TRACES_SAMPLE_RATE", defaults.traces_sample_rate)?,
        })
    }
}

/// Where configuration values come from. Empty values count as unset.
trait EnvSource {
    fn optional(&self, key: &str) -> Option<String>;

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// A sample rate in `0.0..=1.0`.
    fn rate_or(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let rate: f32 = self.parsed_or(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ))
        }
    }
}

struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn optional(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Strength requirements for a signing secret.
struct SecretCheck<'a> {
    var_name: &'a str,
    /// Minimum length in bytes. A cookie signing key needs 64.
    min_bytes: usize,
    min_bits_per_char: f64,
}

impl<'a> SecretCheck<'a> {
    /// Substrings that give away a copied example value.
    const PLACEHOLDERS: &'static [&'static str] = &[
        "your-",
        "changeme",
        "replace",
        "placeholder",
        "example",
        "secret",
        "password",
        "xxx",
        "todo",
        "fixme",
    ];

    const fn new(var_name: &'a str) -> Self {
        Self {
            var_name,
            min_bytes: 64,
            min_bits_per_char: 3.3,
        }
    }

    fn run(&self, secret: &str) -> Result<(), ConfigError> {
        let lower = secret.to_lowercase();
        if let Some(found) = Self::PLACEHOLDERS.iter().find(|p| lower.contains(*p)) {
            return Err(self.reject(format!("appears to be a placeholder (contains '{found}')")));
        }

        let length = secret.len();
        if length < self.min_bytes {
            return Err(self.reject(format!(
                "must be at least {} bytes (got {length})",
                self.min_bytes
            )));
        }

        let bits = bits_per_char(secret);
        if bits < self.min_bits_per_char {
            return Err(self.reject(format!(
                "entropy too low ({bits:.2} bits/char, need >= {:.1}). Use a randomly generated secret.",
                self.min_bits_per_char
            )));
        }

        Ok(())
    }

    fn reject(&self, reason: String) -> ConfigError {
        ConfigError::InsecureSecret(self.var_name.to_string(), reason)
    }
}

/// Shannon entropy of the character distribution, in bits per character.
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const STRONG_SECRET: &str =
        "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%dE8(fG1)hJ4_kM7+vN2=wP5~sQ9<tR3>";

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl MapEnv {
        fn minimal() -> Self {
            Self(HashMap::from([
                ("DATABASE_URL", "postgres://localhost/minishop"),
                ("STOREFRONT_BASE_URL", "http://localhost:3000"),
                ("STOREFRONT_SESSION_SECRET", STRONG_SECRET),
            ]))
        }

        fn set(mut self, key: &'static str, value: &'static str) -> Self {
            self.0.insert(key, value);
            self
        }
    }

    impl EnvSource for MapEnv {
        fn optional(&self, key: &str) -> Option<String> {
            self.0
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| (*v).to_string())
        }
    }

    #[test]
    fn test_minimal_env_uses_defaults() {
        let config = StorefrontConfig::from_source(&MapEnv::minimal()).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(
            config.database_url.expose_secret(),
            "postgres://localhost/minishop"
        );
        assert!(!config.is_secure());
        assert!(config.sentry.dsn.is_none());
        assert!((config.sentry.sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(config.sentry.traces_sample_rate.abs() < f32::EPSILON);
    }

    #[test]
    fn test_storefront_database_url_wins() {
        let env = MapEnv::minimal().set("STOREFRONT_DATABASE_URL", "postgres://db/shop");
        let config = StorefrontConfig::from_source(&env).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://db/shop");
    }

    #[test]
    fn test_missing_database_url() {
        let env = MapEnv::minimal().set("DATABASE_URL", "");
        assert!(matches!(
            StorefrontConfig::from_source(&env),
            Err(ConfigError::MissingEnvVar(key)) if key == "STOREFRONT_DATABASE_URL"
        ));
    }

    #[test]
    fn test_base_url_needs_scheme() {
        let env = MapEnv::minimal().set("STOREFRONT_BASE_URL", "shop.example.org");
        assert!(matches!(
            StorefrontConfig::from_source(&env),
            Err(ConfigError::InvalidEnvVar(..))
        ));

        let env = MapEnv::minimal().set("STOREFRONT_BASE_URL", "https://shop.example.org");
        assert!(StorefrontConfig::from_source(&env).unwrap().is_secure());
    }

    #[test]
    fn test_host_and_port_overrides() {
        let env = MapEnv::minimal()
            .set("STOREFRONT_HOST", "0.0.0.0")
            .set("STOREFRONT_PORT", "8080");
        let config = StorefrontConfig::from_source(&env).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");

        let env = MapEnv::minimal().set("STOREFRONT_PORT", "eighty");
        assert!(StorefrontConfig::from_source(&env).is_err());
    }

    #[test]
    fn test_sample_rate_range() {
        let env = MapEnv::minimal().set("SENTRY_TRACES_SAMPLE_RATE", "0.25");
        let config = StorefrontConfig::from_source(&env).unwrap();
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);

        let env = MapEnv::minimal().set("SENTRY_SAMPLE_RATE", "1.5");
        assert!(matches!(
            StorefrontConfig::from_source(&env),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_secret_rejections() {
        let check = SecretCheck::new("S");
        let repetitive = "ab".repeat(40);
        let old_length = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";
        for weak in [
            "short",
            old_length,
            "changeme-please-0123456789abcdefgh-0123456789abcdefgh-0123456789",
            repetitive.as_str(),
        ] {
            assert!(
                matches!(check.run(weak), Err(ConfigError::InsecureSecret(..))),
                "{weak}"
            );
        }
        assert!(check.run(STRONG_SECRET).is_ok());
    }

    #[test]
    fn test_bits_per_char() {
        assert!(bits_per_char("").abs() < f64::EPSILON);
        assert!(bits_per_char("aaaaaaa").abs() < f64::EPSILON);
        assert!((bits_per_char("ab") - 1.0).abs() < 0.01);
    }
}
