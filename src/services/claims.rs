use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::menu::{ClaimResult, MenuItem, WeekMenu};
use crate::services::metrics::{CLAIMS_COUNTER, WEEK_LOOKUPS_COUNTER};
use crate::services::store::{
    claimant_cell, CellAddress, StoreError, TabularStore, CLAIMANT_COLUMN, FIRST_ITEM_ROW, HEADER_ROW,
    ITEM_COLUMN, NEXT_THEME_CELL, THEME_CELL,
};

pub const MAX_NAME_LEN: usize = 100;

const DEFAULT_ITEM_HEADER: &str = "Food/Drink Item";

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("no sheet for week {0}")]
    WeekNotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error("sign-up sheet unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for ClaimError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => ClaimError::StoreUnavailable(msg),
            other => ClaimError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Reads a week's menu and records who is bringing what.
pub struct ClaimService<S> {
    store: S,
}

impl<S: TabularStore> ClaimService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the sheet named after `week_key`.
    pub async fn fetch_items(&self, week_key: i64) -> Result<WeekMenu, ClaimError> {
        let sheet = week_key.to_string();
        let rows = self.load_rows(week_key).await?;

        let theme = self.read_optional(&sheet, THEME_CELL).await?;
        let next_week_theme = self.read_optional(&sheet, NEXT_THEME_CELL).await?;

        let item_header = rows
            .get(HEADER_ROW as usize - 1)
            .and_then(|row| row.get(ITEM_COLUMN as usize - 1))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ITEM_HEADER)
            .to_string();

        let menu = WeekMenu {
            week_key,
            theme,
            next_week_theme,
            item_header,
            items: items_from_rows(&rows),
        };
        debug!(
            "Week {}: {} item row(s), {} still needed",
            week_key,
            menu.items.len(),
            menu.claimable().count()
        );
        Ok(menu)
    }

    /// Write `claimant` into every requested item whose cell is still blank.
    ///
    /// Every target cell is re-read right before the write, so a claim made by
    /// someone else since the page was rendered is rejected instead of being
    /// overwritten. Two submissions landing between each other's read and
    /// write can still both succeed; the later write wins.
    pub async fn submit_claims(
        &self,
        week_key: i64,
        requested: &[String],
        claimant: &str,
    ) -> Result<ClaimResult, ClaimError> {
        let claimant = claimant.trim();
        if claimant.is_empty() {
            return Err(ClaimError::Validation("Please enter your name.".into()));
        }
        if claimant.chars().count() > MAX_NAME_LEN {
            return Err(ClaimError::Validation(format!(
                "Please keep your name under {MAX_NAME_LEN} characters."
            )));
        }

        let mut wanted: Vec<&str> = Vec::new();
        for name in requested.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !wanted.contains(&name) {
                wanted.push(name);
            }
        }
        if wanted.is_empty() {
            return Err(ClaimError::Validation(
                "Please select at least one item to bring.".into(),
            ));
        }

        let sheet = week_key.to_string();
        let rows = self.load_rows(week_key).await?;
        let items = items_from_rows(&rows);

        let mut result = ClaimResult::default();
        let mut seen = HashSet::new();

        for item in &items {
            let name = item.name.trim();
            if !wanted.contains(&name) || !seen.insert(name) {
                continue;
            }

            let cell = claimant_cell(item.row);
            let current = self.read_optional(&sheet, cell).await?;
            // Any content, whitespace included, means the item is taken
            if !current.is_empty() {
                debug!("Week {}: {} already claimed ({})", week_key, cell, current);
                CLAIMS_COUNTER.with_label_values(&["conflict"]).inc();
                result.rejected.push(name.to_string());
                continue;
            }

            self.store.write_cell(&sheet, cell, claimant).await?;
            debug!("Week {}: wrote {} into {}", week_key, claimant, cell);
            CLAIMS_COUNTER.with_label_values(&["accepted"]).inc();
            result.accepted.push(name.to_string());
        }

        for name in wanted {
            if !seen.contains(name) {
                CLAIMS_COUNTER.with_label_values(&["missing"]).inc();
                result.missing.push(name.to_string());
            }
        }

        info!(
            "Week {}: {} claimed {:?}, rejected {:?}, missing {:?}",
            week_key, claimant, result.accepted, result.rejected, result.missing
        );
        Ok(result)
    }

    async fn load_rows(&self, week_key: i64) -> Result<Vec<Vec<String>>, ClaimError> {
        match self.store.get_table(&week_key.to_string()).await {
            Ok(rows) => {
                WEEK_LOOKUPS_COUNTER.with_label_values(&["found"]).inc();
                Ok(rows)
            }
            Err(StoreError::TableNotFound(_)) => {
                WEEK_LOOKUPS_COUNTER.with_label_values(&["not_found"]).inc();
                Err(ClaimError::WeekNotFound(week_key))
            }
            Err(e) => {
                WEEK_LOOKUPS_COUNTER.with_label_values(&["error"]).inc();
                warn!("Week {}: store error: {}", week_key, e);
                Err(e.into())
            }
        }
    }

    /// A missing cell reads as blank.
    async fn read_optional(
        &self,
        sheet: &str,
        cell: CellAddress,
    ) -> Result<String, ClaimError> {
        match self.store.read_cell(sheet, cell).await {
            Ok(value) => Ok(value),
            Err(StoreError::CellNotFound(_)) => Ok(String::new()),
            Err(StoreError::TableNotFound(_)) => Err(ClaimError::WeekNotFound(
                sheet.parse().unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Item rows start below the header; list index `i` is sheet row `i + 3`.
fn items_from_rows(rows: &[Vec<String>]) -> Vec<MenuItem> {
    let cell = |row: &Vec<String>, col: u32| row.get(col as usize - 1).cloned().unwrap_or_default();
    rows.iter()
        .enumerate()
        .skip(FIRST_ITEM_ROW as usize - 1)
        .map(|(index, row)| MenuItem {
            name: cell(row, ITEM_COLUMN),
            claimant: cell(row, CLAIMANT_COLUMN),
            row: index as u32 + 1,
        })
        .collect()
}
