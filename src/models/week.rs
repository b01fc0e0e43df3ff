use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Which worksheet is live for a given day, and the Sunday it is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekResolution {
    pub week_key: i64,
    pub target_sunday: NaiveDate,
}

impl WeekResolution {
    /// Worksheet title for this week ("2", "3", ...).
    pub fn sheet_name(&self) -> String {
        self.week_key.to_string()
    }
}

/// Maps calendar days onto week-numbered worksheets.
///
/// The week that starts on the Monday after the anchor Sunday is sheet
/// `offset`. A Monday..Sunday run shares one key, so the key rolls over at
/// Monday 00:00 and a Sunday still belongs to the week leading up to it.
#[derive(Debug, Clone, Copy)]
pub struct WeekResolver {
    anchor: NaiveDate,
    offset: i64,
}

impl WeekResolver {
    pub fn new(anchor: NaiveDate, offset: i64) -> Self {
        Self { anchor, offset }
    }

    pub fn resolve(&self, today: NaiveDate) -> WeekResolution {
        // Shift by a day so Sundays close their week instead of opening one
        let days = (today - self.anchor).num_days() - 1;
        WeekResolution {
            week_key: days.div_euclid(7) + self.offset,
            target_sunday: upcoming_sunday(today),
        }
    }
}

/// The next Sunday on or after `today`.
pub fn upcoming_sunday(today: NaiveDate) -> NaiveDate {
    // 0 = Monday .. 6 = Sunday
    let weekday = today.weekday().num_days_from_monday() as i64;
    let days_until_sunday = (6 - weekday).rem_euclid(7);
    today + Duration::days(days_until_sunday)
}
