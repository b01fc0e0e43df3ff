use std::fmt;
use std::future::Future;

use thiserror::Error;

/// 1-based cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// A1 notation, e.g. `B5` or `AA12`.
impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut col = self.col;
        while col > 0 {
            let rem = (col - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            col = (col - 1) / 26;
        }
        let column: String = letters.iter().rev().collect();
        write!(f, "{}{}", column, self.row)
    }
}

// ── Sheet layout ────────────────────────────────────────────────────────────

/// This week's theme.
pub const THEME_CELL: CellAddress = CellAddress::new(1, 2);
/// Next week's theme, for people who plan ahead.
pub const NEXT_THEME_CELL: CellAddress = CellAddress::new(2, 5);
/// Row holding the column labels.
pub const HEADER_ROW: u32 = 2;
/// First item row; list index `i` lives on row `i + FIRST_ITEM_ROW`.
pub const FIRST_ITEM_ROW: u32 = 3;
pub const ITEM_COLUMN: u32 = 1;
pub const CLAIMANT_COLUMN: u32 = 2;

pub fn claimant_cell(row: u32) -> CellAddress {
    CellAddress::new(row, CLAIMANT_COLUMN)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("cell {0} not found")]
    CellNotFound(CellAddress),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The spreadsheet as seen by the claim logic.
///
/// `write_cell` is an unconditional set; deciding whether a write is allowed
/// is the caller's job.
pub trait TabularStore: Send + Sync {
    /// All rows of the named table, top to bottom. Rows may be ragged.
    fn get_table(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<Vec<String>>, StoreError>> + Send;

    /// Current value of one cell, `""` when blank.
    fn read_cell(
        &self,
        table: &str,
        addr: CellAddress,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    fn write_cell(
        &self,
        table: &str,
        addr: CellAddress,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
