use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use tracing::{debug, info, warn};

use crate::models::week::WeekResolver;
use crate::services::claims::{ClaimError, ClaimService};
use crate::services::metrics;
use crate::services::store::TabularStore;
use crate::state::{AppState, SheetStatus, WeekSnapshot};

/// Spawn a background task that wakes up at every local Monday 00:00 and
/// rolls the served week over. The task only reads from the sheet.
pub fn start(state: AppState) {
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let target = next_monday_midnight(now.naive_local());
            let wait = match Local.from_local_datetime(&target).earliest() {
                Some(at) => at.signed_duration_since(now),
                None => target - now.naive_local(),
            };
            debug!("Week scheduler: next refresh at {} (in {}s)", target, wait.num_seconds());
            tokio::time::sleep(wait.to_std().unwrap_or_default()).await;

            // Never refresh early into the old week
            while Local::now().naive_local() < target {
                tokio::time::sleep(std::time::Duration::from_millis(250)).await;
            }

            refresh(&state).await;
        }
    });
}

/// Recompute the current week from today's local date and publish it.
pub async fn refresh(state: &AppState) {
    let today = Local::now().date_naive();
    let snapshot = build_snapshot(&state.claims, &state.resolver, today).await;
    *state.week.write().await = snapshot;
}

pub async fn build_snapshot<S: TabularStore>(
    claims: &ClaimService<S>,
    resolver: &WeekResolver,
    today: NaiveDate,
) -> WeekSnapshot {
    let resolution = resolver.resolve(today);
    debug!(
        "Week scheduler: {} resolves to week {} (Sunday {})",
        today, resolution.week_key, resolution.target_sunday
    );

    let (sheet, menu) = match claims.fetch_items(resolution.week_key).await {
        Ok(menu) => (
            SheetStatus::Ready {
                items: menu.items.iter().filter(|i| !i.name.trim().is_empty()).count(),
                unclaimed: menu.claimable().count(),
            },
            Some(menu),
        ),
        Err(ClaimError::WeekNotFound(week)) => {
            warn!("Week scheduler: no sheet for week {}", week);
            (SheetStatus::NotFound, None)
        }
        Err(e) => {
            warn!("Week scheduler: could not read week {}: {}", resolution.week_key, e);
            (SheetStatus::Unavailable { error: e.to_string() }, None)
        }
    };

    metrics::record_refresh(&resolution, menu.as_ref());
    info!(
        "Serving week {} for Sunday {} ({:?})",
        resolution.week_key, resolution.target_sunday, sheet
    );

    WeekSnapshot {
        resolution,
        refreshed_at: Local::now(),
        sheet,
    }
}

/// The first Monday 00:00 strictly after `now`.
pub fn next_monday_midnight(now: NaiveDateTime) -> NaiveDateTime {
    let days_from_monday = now.date().weekday().num_days_from_monday() as i64;
    let days_ahead = 7 - days_from_monday;
    (now.date() + Duration::days(days_ahead)).and_time(NaiveTime::MIN)
}
