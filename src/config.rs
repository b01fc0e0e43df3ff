use std::env;

use chrono::{Datelike, NaiveDate, Weekday};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub spreadsheet_id: String,
    /// Raw service-account JSON, either inline or read from a file.
    pub service_account_key: String,
    pub anchor_date: NaiveDate,
    pub week_offset: i64,
    pub app_password: Option<String>,
    // Page text and assets
    pub group_name: String,
    pub coordinator_name: String,
    pub assets_dir: String,
    pub header_image: String,
    pub thanks_image: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let anchor_date: NaiveDate = env::var("ANCHOR_DATE")
            .unwrap_or_else(|_| "2025-01-12".into())
            .parse()?;
        if anchor_date.weekday() != Weekday::Sun {
            anyhow::bail!("ANCHOR_DATE must be a Sunday, got {}", anchor_date);
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            spreadsheet_id: required("SPREADSHEET_ID")?,
            service_account_key: service_account_key()?,
            anchor_date,
            week_offset: env::var("WEEK_OFFSET")
                .unwrap_or_else(|_| "2".into())
                .parse()?,
            app_password: env::var("APP_PASSWORD").ok().filter(|s| !s.is_empty()),
            group_name: env::var("GROUP_NAME").unwrap_or_else(|_| "Community Group".into()),
            coordinator_name: env::var("COORDINATOR_NAME")
                .unwrap_or_else(|_| "the organizer".into()),
            assets_dir: env::var("ASSETS_DIR").unwrap_or_else(|_| "./assets".into()),
            header_image: env::var("HEADER_IMAGE").unwrap_or_else(|_| "dtgville.jpg".into()),
            thanks_image: env::var("THANKS_IMAGE").unwrap_or_else(|_| "fountain.jpg".into()),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

/// Inline JSON wins over a key file.
fn service_account_key() -> anyhow::Result<String> {
    if let Some(inline) = env::var("GOOGLE_SERVICE_ACCOUNT_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty())
    {
        return Ok(inline);
    }

    let path = env::var("GOOGLE_SERVICE_ACCOUNT_FILE").map_err(|_| {
        anyhow::anyhow!(
            "Missing required env var: GOOGLE_SERVICE_ACCOUNT_KEY or GOOGLE_SERVICE_ACCOUNT_FILE"
        )
    })?;
    std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read service account file {}: {}", path, e))
}
