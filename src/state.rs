use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::week::{WeekResolution, WeekResolver};
use crate::services::claims::ClaimService;
use crate::services::sheets::SheetsClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub claims: Arc<ClaimService<SheetsClient>>,
    pub resolver: WeekResolver,
    pub week: Arc<RwLock<WeekSnapshot>>,
}

/// What the last refresh found for the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetStatus {
    Ready { items: usize, unclaimed: usize },
    NotFound,
    Unavailable { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekSnapshot {
    #[serde(flatten)]
    pub resolution: WeekResolution,
    pub refreshed_at: DateTime<Local>,
    pub sheet: SheetStatus,
}

impl WeekSnapshot {
    /// Placeholder until the first refresh has talked to the store.
    pub fn pending(resolution: WeekResolution) -> Self {
        Self {
            resolution,
            refreshed_at: Local::now(),
            sheet: SheetStatus::Unavailable {
                error: "not refreshed yet".into(),
            },
        }
    }
}
