//! # Service Configuration
//!
//! All settings come from environment variables. Development defaults let
//! the service start with nothing set (in-memory catalog, password `admin`);
//! production refuses to start with a missing database or default secrets.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PORT` | `3000` |
//! | `APP_ENV` | `development` |
//! | `DATABASE_URL` | unset (in-memory catalog) |
//! | `SESSION_SECRET` | `totem-admin-secret-key` |
//! | `ADMIN_PASSWORD` | `admin` |
//! | `PUBLIC_DIR` | `public` |
//! | `ICONS_DIR` | `$PUBLIC_DIR/icons` |
//! | `TOTEM_METRICS_ENABLED` | `true` |
//! | `TOTEM_TRUSTED_PROXY_HOPS` | `0` (rate limit keys on the peer address) |
//! | `TOTEM_CACHE_TTL_TRAMITES_SECS` | `30` |
//! | `TOTEM_CACHE_TTL_MODULOS_SECS` | `30` |
//! | `TOTEM_CACHE_TTL_REQUISITOS_SECS` | `15` |
//! | `TOTEM_CACHE_TTL_ASSOCIATIONS_SECS` | `15` |
//! | `TOTEM_GUIDE_MESSAGE` | built-in Spanish invitation |

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use totem_core::KioskSettings;
use zeroize::Zeroize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_SECRET: &str = "totem-admin-secret-key";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

// -- Secrets ------------------------------------------------------------------

/// String secret that is redacted in `Debug` output and zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// -- Errors -------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("DATABASE_URL is required in production")]
    MissingDatabaseUrl,

    #[error("SESSION_SECRET must be set to a strong value in production")]
    WeakSessionSecret,

    #[error("ADMIN_PASSWORD must be changed in production")]
    DefaultAdminPassword,
}

// -- Settings -----------------------------------------------------------------

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Time-to-live of each catalog read cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub tramites: Duration,
    pub modulos: Duration,
    pub requisitos: Duration,
    pub associations: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            tramites: Duration::from_secs(30),
            modulos: Duration::from_secs(30),
            requisitos: Duration::from_secs(15),
            associations: Duration::from_secs(15),
        }
    }
}

impl CacheTtls {
    /// Every cache disabled.
    pub fn disabled() -> Self {
        Self {
            tramites: Duration::ZERO,
            modulos: Duration::ZERO,
            requisitos: Duration::ZERO,
            associations: Duration::ZERO,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    /// Postgres connection string. `None` runs the in-memory catalog.
    pub database_url: Option<SecretString>,
    /// Key material for signing the session cookie.
    pub session_secret: SecretString,
    pub admin_password: SecretString,
    /// Root of the static front-end.
    pub public_dir: PathBuf,
    /// Where uploaded icons are stored and served from (`/icons/*`).
    pub icons_dir: PathBuf,
    pub metrics_enabled: bool,
    /// Reverse proxies whose `X-Forwarded-For` entries are trusted.
    pub trusted_proxy_hops: usize,
    pub cache_ttls: CacheTtls,
    pub kiosk: KioskSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let public_dir = PathBuf::from("public");
        Self {
            port: DEFAULT_PORT,
            environment: Environment::Development,
            database_url: None,
            session_secret: SecretString::new(DEFAULT_SESSION_SECRET),
            admin_password: SecretString::new(DEFAULT_ADMIN_PASSWORD),
            icons_dir: public_dir.join("icons"),
            public_dir,
            metrics_enabled: true,
            trusted_proxy_hops: 0,
            cache_ttls: CacheTtls::default(),
            kiosk: KioskSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, then enforce production rules.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let public_dir = var("PUBLIC_DIR").map_or(defaults.public_dir, PathBuf::from);
        let icons_dir = var("ICONS_DIR").map_or_else(|| public_dir.join("icons"), PathBuf::from);

        let mut kiosk = defaults.kiosk;
        if let Some(message) = var("TOTEM_GUIDE_MESSAGE") {
            kiosk.guide_message = message;
        }

        let config = Self {
            port: parse_or(&var, "PORT", DEFAULT_PORT)?,
            environment: parse_or(&var, "APP_ENV", Environment::Development)?,
            database_url: var("DATABASE_URL").map(SecretString::new),
            session_secret: var("SESSION_SECRET")
                .map_or(defaults.session_secret, SecretString::new),
            admin_password: var("ADMIN_PASSWORD")
                .map_or(defaults.admin_password, SecretString::new),
            public_dir,
            icons_dir,
            metrics_enabled: var("TOTEM_METRICS_ENABLED")
                .map_or(true, |v| v.to_lowercase() != "false"),
            trusted_proxy_hops: parse_or(&var, "TOTEM_TRUSTED_PROXY_HOPS", 0)?,
            cache_ttls: CacheTtls {
                tramites: secs_or(&var, "TOTEM_CACHE_TTL_TRAMITES_SECS", defaults.cache_ttls.tramites)?,
                modulos: secs_or(&var, "TOTEM_CACHE_TTL_MODULOS_SECS", defaults.cache_ttls.modulos)?,
                requisitos: secs_or(
                    &var,
                    "TOTEM_CACHE_TTL_REQUISITOS_SECS",
                    defaults.cache_ttls.requisitos,
                )?,
                associations: secs_or(
                    &var,
                    "TOTEM_CACHE_TTL_ASSOCIATIONS_SECS",
                    defaults.cache_ttls.associations,
                )?,
            },
            kiosk,
        };

        config.enforce_production_rules()?;
        Ok(config)
    }

    fn enforce_production_rules(&self) -> Result<(), ConfigError> {
        if !self.environment.is_production() {
            return Ok(());
        }
        if self.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.session_secret.expose() == DEFAULT_SESSION_SECRET {
            return Err(ConfigError::WeakSessionSecret);
        }
        if self.admin_password.expose() == DEFAULT_ADMIN_PASSWORD {
            return Err(ConfigError::DefaultAdminPassword);
        }
        Ok(())
    }

    /// Session cookies carry `Secure` outside development.
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
        }),
    }
}

fn secs_or(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    parse_or(var, key, default.as_secs()).map(Duration::from_secs)
}
