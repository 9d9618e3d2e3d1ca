use serde::Deserialize;
use tracing::warn;

/// Fallback signing key used when JWT_SECRET is absent. Keeping the process
/// up with a known key (instead of failing startup) matches the original
/// product behavior; the warning below is the only guard rail.
const DEV_JWT_SECRET: &str = "dev-only-insecure-signing-key-change-me";

const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

/// Credentials for the one-time admin provisioning at first startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeedConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub admin_seed: AdminSeedConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("JWT_SECRET not set; falling back to the development signing key");
                DEV_JWT_SECRET.into()
            }
        };
        let jwt = JwtConfig {
            secret,
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };

        let admin_password = match std::env::var("ADMIN_PASSWORD") {
            Ok(p) if !p.is_empty() => p,
            _ => {
                warn!("ADMIN_PASSWORD not set; the seeded admin uses the default password");
                DEFAULT_ADMIN_PASSWORD.into()
            }
        };
        let admin_seed = AdminSeedConfig {
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.into()),
            password: admin_password,
        };

        Ok(Self {
            database_url,
            jwt,
            admin_seed,
        })
    }
}
