use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge, CounterVec, Gauge};

use crate::models::menu::WeekMenu;
use crate::models::week::WeekResolution;

lazy_static! {
    // ── Event counters ──────────────────────────────────────────────────────
    pub static ref CLAIMS_COUNTER: CounterVec = register_counter_vec!(
        "signup_claims_total",
        "Item claims by outcome (accepted, conflict, missing)",
        &["outcome"]
    ).unwrap();

    pub static ref WEEK_LOOKUPS_COUNTER: CounterVec = register_counter_vec!(
        "signup_week_lookups_total",
        "Week sheet lookups by outcome (found, not_found, error)",
        &["outcome"]
    ).unwrap();

    // ── Refreshed by the weekly trigger ─────────────────────────────────────
    pub static ref CURRENT_WEEK_GAUGE: Gauge = register_gauge!(
        "signup_current_week",
        "Week key currently being served"
    ).unwrap();

    pub static ref UNCLAIMED_ITEMS_GAUGE: Gauge = register_gauge!(
        "signup_unclaimed_items",
        "Items still needing someone to bring them at the last refresh"
    ).unwrap();
}

pub fn record_refresh(resolution: &WeekResolution, menu: Option<&WeekMenu>) {
    CURRENT_WEEK_GAUGE.set(resolution.week_key as f64);
    let unclaimed = menu.map(|m| m.claimable().count()).unwrap_or(0);
    UNCLAIMED_ITEMS_GAUGE.set(unclaimed as f64);
}
