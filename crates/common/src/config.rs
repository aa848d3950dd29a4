use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string (includes the service credential)
    pub database_url: String,

    /// Redis connection string, used for the bounded event logs
    pub redis_url: String,

    /// HTTP listening port (default: 10000)
    pub port: u16,

    /// Admin bot token used to forward notifications
    pub bot_token: Option<String>,

    /// Admin chat id that receives every notification
    pub admin_chat_id: Option<String>,

    /// Optional override bot token
    pub override_token: Option<String>,

    /// Optional override chat id
    pub override_chat_id: Option<String>,

    /// Shared secret for admin actions. Empty disables admin actions entirely.
    pub admin_secret: String,

    /// JWT secret for contractor sessions
    pub jwt_secret: String,

    /// JWT token expiry in hours
    pub jwt_expiry_hours: u64,

    /// Telegram Bot API base URL
    pub telegram_api_base: String,

    /// Directory where review images are written
    pub uploads_dir: String,

    /// Number of entries kept per event log (default: 1000)
    pub log_retention: usize,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid u16"))?,
            bot_token: non_empty_var("BOT_TOKEN"),
            admin_chat_id: non_empty_var("ADMIN_CHAT_ID"),
            override_token: non_empty_var("ADMIN_OVERRIDE_TOKEN"),
            override_chat_id: non_empty_var("ADMIN_OVERRIDE_CHAT_ID"),
            admin_secret: std::env::var("ADMIN_SECRET").unwrap_or_default(),
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiry_hours: parse_expiry_hours(
                &std::env::var("JWT_EXPIRY_HOURS").unwrap_or_else(|_| "24".to_string()),
            )?,
            telegram_api_base: std::env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            uploads_dir: std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()),
            log_retention: std::env::var("LOG_RETENTION")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LOG_RETENTION must be a valid usize"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
        })
    }

    /// Whether admin actions can be authorized at all.
    pub fn admin_enabled(&self) -> bool {
        !self.admin_secret.is_empty()
    }
}

/// Longest accepted session lifetime: ten years.
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

/// Parse `JWT_EXPIRY_HOURS`, which must be between 1 and `MAX_JWT_EXPIRY_HOURS`.
fn parse_expiry_hours(raw: &str) -> anyhow::Result<u64> {
    let hours: u64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("JWT_EXPIRY_HOURS must be a valid u64"))?;
    if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
        anyhow::bail!(
            "JWT_EXPIRY_HOURS must be between 1 and {}",
            MAX_JWT_EXPIRY_HOURS
        );
    }
    Ok(hours)
}

/// Read an env var, treating blank values as unset.
fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_hours_bounds() {
        assert_eq!(parse_expiry_hours("24").unwrap(), 24);
        assert_eq!(parse_expiry_hours(" 48 ").unwrap(), 48);
        assert!(parse_expiry_hours("0").is_err());
        assert!(parse_expiry_hours("-1").is_err());
        assert!(parse_expiry_hours("18446744073709551615").is_err());
        assert!(parse_expiry_hours(&(MAX_JWT_EXPIRY_HOURS + 1).to_string()).is_err());
        assert_eq!(
            parse_expiry_hours(&MAX_JWT_EXPIRY_HOURS.to_string()).unwrap(),
            MAX_JWT_EXPIRY_HOURS
        );
    }
}
