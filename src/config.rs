use std::env;

use chrono::{Duration, NaiveDateTime, Utc};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub notify_webhook_url: String,
    pub currency: String,
    pub utc_offset_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "detailbook.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL").unwrap_or_default(),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "usd".to_string()),
            utc_offset_minutes: env::var("UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Wall-clock now in the shop's timezone. Slot cutoffs follow the
    /// shop's day, not the server's.
    pub fn business_now(&self) -> NaiveDateTime {
        Utc::now().naive_utc() + Duration::minutes(self.utc_offset_minutes)
    }
}
