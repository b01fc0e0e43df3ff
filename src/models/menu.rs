use serde::Serialize;

/// One food/drink row of a week's sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub name: String,
    /// Empty when nobody has signed up yet.
    pub claimant: String,
    /// 1-based sheet row the item lives on.
    pub row: u32,
}

impl MenuItem {
    pub fn is_claimable(&self) -> bool {
        !self.name.trim().is_empty() && self.claimant.is_empty()
    }
}

/// Everything shown for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekMenu {
    pub week_key: i64,
    pub theme: String,
    pub next_week_theme: String,
    pub item_header: String,
    pub items: Vec<MenuItem>,
}

impl WeekMenu {
    /// Items still needed, in sheet order.
    pub fn claimable(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter(|item| item.is_claimable())
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.name.trim().is_empty())
    }
}

/// Body for POST /claims.
///
/// The multi-select posts one `items` pair per selected option, which
/// `serde_urlencoded` cannot fold into a struct field, so the handler reads
/// the raw pairs and builds this.
#[derive(Debug, Default, Clone)]
pub struct ClaimRequest {
    pub items: Vec<String>,
    pub name: String,
    pub password: Option<String>,
    /// Week the form was rendered for; absent or garbled values are ignored.
    pub week: Option<i64>,
}

impl ClaimRequest {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut req = ClaimRequest::default();
        for (key, value) in pairs {
            match key.as_str() {
                "items" => req.items.push(value),
                "name" => req.name = value,
                "password" => req.password = Some(value),
                "week" => req.week = value.trim().parse().ok(),
                _ => {}
            }
        }
        req
    }
}

/// Per-item outcome of a claim batch, each list in sheet order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimResult {
    pub accepted: Vec<String>,
    /// Someone else's name was already in the cell.
    pub rejected: Vec<String>,
    /// No longer on the sheet.
    pub missing: Vec<String>,
}
