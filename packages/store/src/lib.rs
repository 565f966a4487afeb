#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Append-only xlsx store for extracted dividend records.
//!
//! The ledger is a single workbook with a `Dividends` sheet whose first row
//! is the fixed [`HEADER`]. Each run loads the workbook (or starts a new
//! one), appends its rows after the last used row, and saves the whole file
//! once. Existing rows, other sheets, and formatting are left as they are.
//!
//! Rows are never de-duplicated: appending the same records twice stores
//! them twice.

use std::path::{Path, PathBuf};

use dividend_ledger_models::DividendRecord;
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// Name of the sheet that holds the ledger.
pub const SHEET_NAME: &str = "Dividends";

/// Column titles written to row 1 of a new ledger.
pub const HEADER: [&str; 4] = ["Date", "Name", "Dividend Details", "Amount"];

/// Errors raised while loading or saving the ledger.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The workbook exists but has no [`SHEET_NAME`] sheet.
    #[error("sheet '{sheet}' not found in {}", path.display())]
    SheetNotFound {
        /// Path of the workbook.
        path: PathBuf,
        /// Name of the missing sheet.
        sheet: &'static str,
    },

    /// The workbook could not be read or written.
    #[error("xlsx error: {0}")]
    Xlsx(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What an append did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendSummary {
    /// Whether the workbook was created by this append.
    pub created: bool,
    /// Data rows (header excluded) present before the append.
    pub existing_rows: u32,
    /// Rows added by the append.
    pub appended: u32,
}

/// A data row read back from the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Contents of the `Date` column.
    pub date: String,
    /// Contents of the `Name` column.
    pub name: String,
    /// Contents of the `Dividend Details` column.
    pub dividend_details: String,
    /// Numeric value of the `Amount` column, `None` when the cell is not
    /// a number.
    pub amount: Option<f64>,
}

/// Appends `records` to the `Dividends` sheet of the workbook at `path`.
///
/// A missing workbook is created with a header row, even when `records` is
/// empty. Amounts are written as numeric cells.
///
/// # Errors
///
/// * [`StoreError::SheetNotFound`] if the workbook exists without a
///   `Dividends` sheet; the file is left untouched
/// * [`StoreError::Xlsx`] if the workbook cannot be read or written
/// * [`StoreError::Io`] if the path cannot be inspected
pub fn append_records(
    path: &Path,
    records: &[DividendRecord],
) -> Result<AppendSummary, StoreError> {
    let created = !path.try_exists()?;

    let mut book = if created {
        log::info!("Creating new ledger at {}", path.display());
        new_ledger()?
    } else {
        umya_spreadsheet::reader::xlsx::read(path).map_err(|e| StoreError::Xlsx(e.to_string()))?
    };

    let sheet = book
        .get_sheet_by_name_mut(SHEET_NAME)
        .ok_or_else(|| StoreError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: SHEET_NAME,
        })?;

    let last_row = sheet.get_highest_row();
    let existing_rows = last_row.saturating_sub(1);

    let mut row = last_row;
    for record in records {
        row += 1;
        write_record(sheet, row, record);
    }
    let appended = row - last_row;

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| StoreError::Xlsx(e.to_string()))?;

    log::info!(
        "Appended {appended} row(s) to {} ({existing_rows} existing)",
        path.display()
    );

    Ok(AppendSummary {
        created,
        existing_rows,
        appended,
    })
}

/// Reads every data row (header excluded) of the `Dividends` sheet.
///
/// # Errors
///
/// * [`StoreError::SheetNotFound`] if the workbook has no `Dividends` sheet
/// * [`StoreError::Xlsx`] if the workbook cannot be read
pub fn read_rows(path: &Path) -> Result<Vec<StoredRow>, StoreError> {
    let book =
        umya_spreadsheet::reader::xlsx::read(path).map_err(|e| StoreError::Xlsx(e.to_string()))?;

    let sheet = book
        .get_sheet_by_name(SHEET_NAME)
        .ok_or_else(|| StoreError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: SHEET_NAME,
        })?;

    let text = |col: u32, row: u32| {
        sheet
            .get_cell((col, row))
            .map(|cell| cell.get_value().into_owned())
            .unwrap_or_default()
    };

    Ok((2..=sheet.get_highest_row())
        .map(|row| StoredRow {
            date: text(1, row),
            name: text(2, row),
            dividend_details: text(3, row),
            amount: sheet
                .get_cell((4, row))
                .and_then(umya_spreadsheet::Cell::get_value_number),
        })
        .collect())
}

/// Builds an empty workbook with a header-only `Dividends` sheet.
fn new_ledger() -> Result<Spreadsheet, StoreError> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let sheet = book
        .new_sheet(SHEET_NAME)
        .map_err(|e| StoreError::Xlsx(e.to_owned()))?;

    for (col, title) in (1_u32..).zip(HEADER) {
        sheet.get_cell_mut((col, 1)).set_value_string(title);
    }

    Ok(book)
}

fn write_record(sheet: &mut Worksheet, row: u32, record: &DividendRecord) {
    sheet
        .get_cell_mut((1, row))
        .set_value_string(record.date.as_str());
    sheet
        .get_cell_mut((2, row))
        .set_value_string(record.issuer_name.as_str());
    sheet
        .get_cell_mut((3, row))
        .set_value_string(record.dividend_detail.as_str());
    sheet.get_cell_mut((4, row)).set_value_number(record.amount);
}
