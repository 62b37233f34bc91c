use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub public_base_url: String,
    pub notify_queue_size: usize,
    pub base_charge_paise: i64,
    pub tax_percent: u32,
    pub admin_emails: Vec<String>,
    pub verification_ttl_hours: i64,
    pub mail_mode: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let admin_emails = env::var("ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            notify_queue_size: parse_or_default("NOTIFY_QUEUE_SIZE", 1024)?,
            base_charge_paise: parse_or_default("BASE_CHARGE_PAISE", 10_000)?,
            tax_percent: parse_or_default("TAX_PERCENT", 18)?,
            admin_emails,
            verification_ttl_hours: parse_or_default("VERIFICATION_TTL_HOURS", 24)?,
            mail_mode: env::var("MAIL_MODE").unwrap_or_else(|_| "log".to_string()),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: parse_or_default("SMTP_PORT", 587)?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            smtp_from: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "noreply@parcel-pickup.local".to_string()),
        })
    }
}

impl Default for Config {
    /// In-process defaults, used by tests; never reads the environment.
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            notify_queue_size: 1024,
            base_charge_paise: 10_000,
            tax_percent: 18,
            admin_emails: vec!["ops@parcel-pickup.local".to_string()],
            verification_ttl_hours: 24,
            mail_mode: "log".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_from: "noreply@parcel-pickup.local".to_string(),
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
