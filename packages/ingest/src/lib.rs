#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch ingestion of dividend statement PDFs into an xlsx ledger.
//!
//! A run scans one directory for statements, reads the target page of each,
//! extracts a [`DividendRecord`] from its text, and appends every record it
//! collected to the ledger in a single save. Statements that cannot be read,
//! are too short, or do not yield all four fields are logged and skipped;
//! only an unusable ledger stops the run.

pub mod config;

use std::fmt;
use std::path::{Path, PathBuf};

use dividend_ledger_extract::ExtractError;
use dividend_ledger_models::progress::ProgressCallback;
use dividend_ledger_models::{AmbiguityPolicy, DividendRecord};
use dividend_ledger_pdf::PdfError;
use dividend_ledger_store::{AppendSummary, StoreError};

pub use config::IngestConfig;

/// File name suffix (ASCII case-insensitive) of candidate statements.
pub const DOCUMENT_EXTENSION: &str = ".pdf";

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The configured paths are unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The source directory could not be listed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The ledger could not be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a single statement produced no record.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The target page could not be read.
    #[error(transparent)]
    Read(#[from] PdfError),

    /// The target page did not yield a complete record.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Per-reason counts of skipped statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Statements that could not be opened or decoded.
    pub unreadable: u32,
    /// Statements with fewer pages than the target page.
    pub insufficient_pages: u32,
    /// Statements whose target page lacked at least one field.
    pub incomplete: u32,
    /// Statements refused because a field had several candidates.
    pub ambiguous: u32,
}

impl SkipCounts {
    /// Total number of skipped statements.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.unreadable + self.insufficient_pages + self.incomplete + self.ambiguous
    }

    const fn record(&mut self, err: &DocumentError) {
        match err {
            DocumentError::Read(PdfError::Unreadable { .. }) => self.unreadable += 1,
            DocumentError::Read(PdfError::InsufficientPages { .. }) => {
                self.insufficient_pages += 1;
            }
            DocumentError::Extract(ExtractError::Incomplete { .. }) => self.incomplete += 1,
            DocumentError::Extract(ExtractError::Ambiguous { .. }) => self.ambiguous += 1,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Statements found in the source directory.
    pub documents: u32,
    /// Records extracted and appended.
    pub extracted: u32,
    /// Statements skipped, by reason.
    pub skipped: SkipCounts,
    /// What the append did to the ledger.
    pub store: AppendSummary,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} statement(s): {} extracted, {} skipped \
             ({} unreadable, {} too short, {} incomplete, {} ambiguous); \
             ledger {} with {} new row(s), {} total",
            self.documents,
            self.extracted,
            self.skipped.total(),
            self.skipped.unreadable,
            self.skipped.insufficient_pages,
            self.skipped.incomplete,
            self.skipped.ambiguous,
            if self.store.created { "created" } else { "updated" },
            self.store.appended,
            self.store.existing_rows + self.store.appended,
        )
    }
}

/// Lists the statements in `dir`, sorted by file name.
///
/// Only regular files whose name ends in [`DOCUMENT_EXTENSION`] are
/// returned.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be listed.
pub fn discover_documents(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_statement = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(DOCUMENT_EXTENSION));

        if is_statement && path.is_file() {
            documents.push(path);
        }
    }

    documents.sort();

    Ok(documents)
}

/// Reads the target page of one statement and extracts its record.
///
/// # Errors
///
/// Returns a [`DocumentError`] describing why the statement yields no
/// record. These errors are per-statement and never abort a run.
pub fn process_document(
    path: &Path,
    policy: AmbiguityPolicy,
) -> Result<DividendRecord, DocumentError> {
    let text = dividend_ledger_pdf::read_target_page(path)?;
    Ok(dividend_ledger_extract::extract(&text, policy)?)
}

fn log_skip(path: &Path, err: &DocumentError) {
    match err {
        DocumentError::Read(PdfError::Unreadable { .. }) => {
            log::warn!("Skipping {}: {err}", path.display());
        }
        DocumentError::Read(PdfError::InsufficientPages { .. }) => {
            log::info!(
                "Skipping {}: does not have at least {} pages",
                path.display(),
                dividend_ledger_pdf::TARGET_PAGE
            );
        }
        DocumentError::Extract(ExtractError::Incomplete { .. }) => {
            log::info!("Skipping {}: {err}", path.display());
        }
        DocumentError::Extract(ExtractError::Ambiguous { .. }) => {
            log::warn!("Skipping {} for manual review: {err}", path.display());
        }
    }
}

/// Runs one ingest pass over `config.source_dir`.
///
/// Statements are processed one at a time in file name order. Records are
/// collected in memory and appended to `config.dest_file` with a single
/// save once every statement has been visited. Re-running against the same
/// directory appends the same records again.
///
/// # Errors
///
/// * [`IngestError::Config`] if the configuration fails validation
/// * [`IngestError::Io`] if the source directory cannot be listed
/// * [`IngestError::Store`] if the ledger cannot be loaded or saved,
///   including when it lacks the `Dividends` sheet
pub fn run(
    config: &IngestConfig,
    progress: &dyn ProgressCallback,
) -> Result<RunSummary, IngestError> {
    config.validate()?;

    let documents = discover_documents(&config.source_dir)?;
    log::info!(
        "Found {} statement(s) in {}",
        documents.len(),
        config.source_dir.display()
    );
    progress.set_total(documents.len() as u64);

    let mut records = Vec::with_capacity(documents.len());
    let mut skipped = SkipCounts::default();

    for path in &documents {
        if let Some(name) = path.file_name() {
            progress.set_message(name.to_string_lossy().into_owned());
        }

        match process_document(path, config.ambiguity) {
            Ok(record) => records.push(record),
            Err(e) => {
                log_skip(path, &e);
                skipped.record(&e);
            }
        }

        progress.inc(1);
    }

    log::debug!("Collected dividend data: {records:?}");

    let store = dividend_ledger_store::append_records(&config.dest_file, &records)?;

    let summary = RunSummary {
        documents: u32::try_from(documents.len()).unwrap_or(u32::MAX),
        extracted: store.appended,
        skipped,
        store,
    };

    progress.finish(format!(
        "{} extracted, {} skipped",
        summary.extracted,
        summary.skipped.total()
    ));
    log::info!("{summary}");

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader as _, Xlsx, open_workbook};
    use dividend_ledger_models::progress::NullProgress;
    use dividend_ledger_pdf::fixtures::write_pdf;
    use dividend_ledger_store::{HEADER, SHEET_NAME, read_rows};

    use super::*;

    fn write_statement(dir: &Path, file: &str, issuer: &str, amount: &str) {
        let page = format!(
            "Payment date 15Mar24\n{issuer}\nHolding 500@0.25\nNet Dividend {amount}"
        );
        write_pdf(&dir.join(file), &["Cover", "Account summary", &page]).unwrap();
    }

    fn setup() -> (tempfile::TempDir, tempfile::TempDir) {
        (tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap())
    }

    fn ledger_names(path: &Path) -> Vec<String> {
        read_rows(path).unwrap().into_iter().map(|row| row.name).collect()
    }

    #[test]
    fn skips_short_statement_and_stores_the_rest() {
        let (src, out) = setup();
        write_statement(src.path(), "a.pdf", "Acme Holdings PLC", "125.00");
        write_statement(src.path(), "b.pdf", "Widget Corp", "80.50");
        write_pdf(&src.path().join("c.pdf"), &["Cover", "Dividend 1.00 15Mar24"]).unwrap();

        let dest = out.path().join("ledger.xlsx");
        let summary = run(&IngestConfig::new(src.path(), &dest), &NullProgress).unwrap();

        assert_eq!(summary.documents, 3);
        assert_eq!(summary.extracted, 2);
        assert_eq!(
            summary.skipped,
            SkipCounts {
                insufficient_pages: 1,
                ..SkipCounts::default()
            }
        );

        let rows = read_rows(&dest).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Acme Holdings PLC");
        assert_eq!(rows[0].date, "15Mar24");
        assert_eq!(rows[0].dividend_details, "500@0.25");
        assert_eq!(rows[0].amount, Some(125.0));
        assert_eq!(rows[1].name, "Widget Corp");
        assert_eq!(rows[1].amount, Some(80.5));
    }

    #[test]
    fn creates_ledger_with_dividends_sheet_and_header() {
        let (src, out) = setup();
        write_statement(src.path(), "a.pdf", "Acme Holdings PLC", "123.45");

        let dest = out.path().join("ledger.xlsx");
        assert!(!dest.exists());

        let summary = run(&IngestConfig::new(src.path(), &dest), &NullProgress).unwrap();
        assert!(summary.store.created);
        assert!(dest.exists());

        let mut workbook: Xlsx<_> = open_workbook(&dest).unwrap();
        assert!(workbook.sheet_names().iter().any(|name| name == SHEET_NAME));

        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
        assert_eq!(
            rows[0],
            HEADER
                .iter()
                .map(|h| Data::String((*h).to_owned()))
                .collect::<Vec<_>>()
        );
        assert_eq!(rows[1][3], Data::Float(123.45));
    }

    #[test]
    fn appends_to_existing_ledger_without_touching_old_rows() {
        let (src, out) = setup();
        let dest = out.path().join("ledger.xlsx");

        let existing = [
            DividendRecord {
                date: "01Jan24".to_owned(),
                issuer_name: "Old One Ltd".to_owned(),
                dividend_detail: "10@1.00".to_owned(),
                amount: 10.0,
            },
            DividendRecord {
                date: "02Feb24".to_owned(),
                issuer_name: "Old Two Ltd".to_owned(),
                dividend_detail: "20@1.00".to_owned(),
                amount: 20.0,
            },
        ];
        dividend_ledger_store::append_records(&dest, &existing).unwrap();
        let before = read_rows(&dest).unwrap();

        write_statement(src.path(), "a.pdf", "Acme Holdings PLC", "1.00");
        write_statement(src.path(), "b.pdf", "Widget Corp", "2.00");
        write_statement(src.path(), "c.pdf", "Gadget Group", "3.00");

        let summary = run(&IngestConfig::new(src.path(), &dest), &NullProgress).unwrap();
        assert!(!summary.store.created);
        assert_eq!(summary.store.existing_rows, 2);
        assert_eq!(summary.store.appended, 3);

        let after = read_rows(&dest).unwrap();
        assert_eq!(after.len(), 5);
        assert_eq!(after[..2], before[..]);
        assert_eq!(
            ledger_names(&dest)[2..],
            ["Acme Holdings PLC", "Widget Corp", "Gadget Group"]
        );
    }

    #[test]
    fn rerun_appends_duplicates() {
        let (src, out) = setup();
        write_statement(src.path(), "a.pdf", "Acme Holdings PLC", "125.00");
        write_statement(src.path(), "b.pdf", "Widget Corp", "80.50");
        let dest = out.path().join("ledger.xlsx");
        let config = IngestConfig::new(src.path(), &dest);

        run(&config, &NullProgress).unwrap();
        assert_eq!(read_rows(&dest).unwrap().len(), 2);

        run(&config, &NullProgress).unwrap();
        assert_eq!(
            ledger_names(&dest),
            ["Acme Holdings PLC", "Widget Corp", "Acme Holdings PLC", "Widget Corp"]
        );
    }

    #[test]
    fn rows_follow_sorted_file_names() {
        let (src, out) = setup();
        write_statement(src.path(), "03-gamma.pdf", "Gamma Inc", "3.00");
        write_statement(src.path(), "01-alpha.pdf", "Alpha Ltd", "1.00");
        write_statement(src.path(), "02-beta.pdf", "Beta Co", "2.00");
        let dest = out.path().join("ledger.xlsx");

        run(&IngestConfig::new(src.path(), &dest), &NullProgress).unwrap();

        assert_eq!(ledger_names(&dest), ["Alpha Ltd", "Beta Co", "Gamma Inc"]);
    }

    #[test]
    fn unreadable_and_incomplete_statements_are_skipped() {
        let (src, out) = setup();
        write_statement(src.path(), "good.pdf", "Acme Holdings PLC", "5.00");
        std::fs::write(src.path().join("broken.pdf"), b"not a pdf").unwrap();
        write_pdf(
            &src.path().join("no-amount.pdf"),
            &["Cover", "Summary", "15Mar24\nAcme PLC\n500@0.25\nNo payment"],
        )
        .unwrap();
        let dest = out.path().join("ledger.xlsx");

        let summary = run(&IngestConfig::new(src.path(), &dest), &NullProgress).unwrap();

        assert_eq!(summary.extracted, 1);
        assert_eq!(summary.skipped.unreadable, 1);
        assert_eq!(summary.skipped.incomplete, 1);
        assert_eq!(ledger_names(&dest), ["Acme Holdings PLC"]);
    }

    #[test]
    fn backend_panic_is_counted_as_unreadable_skip() {
        let err = DocumentError::from(PdfError::Unreadable {
            path: PathBuf::from("hostile.pdf"),
            reason: "PDF backend panicked: invalid cross-reference table".to_owned(),
        });
        let mut skipped = SkipCounts::default();

        log_skip(Path::new("hostile.pdf"), &err);
        skipped.record(&err);

        assert_eq!(
            skipped,
            SkipCounts {
                unreadable: 1,
                ..SkipCounts::default()
            }
        );
        assert!(err.to_string().contains("PDF backend panicked"));
    }

    #[test]
    fn reject_policy_skips_ambiguous_statement() {
        let (src, out) = setup();
        write_pdf(
            &src.path().join("two-amounts.pdf"),
            &[
                "Cover",
                "Summary",
                "15Mar24\nAcme PLC\n500@0.25\nNet Dividend 125.00\nGross Dividend 150.00",
            ],
        )
        .unwrap();
        let dest = out.path().join("ledger.xlsx");

        let strict = IngestConfig::new(src.path(), &dest).with_ambiguity(AmbiguityPolicy::Reject);
        let summary = run(&strict, &NullProgress).unwrap();
        assert_eq!(summary.skipped.ambiguous, 1);
        assert!(read_rows(&dest).unwrap().is_empty());

        let lenient = IngestConfig::new(src.path(), &dest);
        run(&lenient, &NullProgress).unwrap();
        let rows = read_rows(&dest).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Some(125.0));
    }

    #[test]
    fn missing_sheet_aborts_run() {
        let (src, out) = setup();
        write_statement(src.path(), "a.pdf", "Acme Holdings PLC", "125.00");
        let dest = out.path().join("ledger.xlsx");

        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        book.new_sheet("Payments").unwrap();
        umya_spreadsheet::writer::xlsx::write(&book, &dest).unwrap();

        let err = run(&IngestConfig::new(src.path(), &dest), &NullProgress).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Store(StoreError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn discovery_is_sorted_and_filters_non_statements() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("b.pdf"), b"").unwrap();
        std::fs::write(src.path().join("A.PDF"), b"").unwrap();
        std::fs::write(src.path().join("notes.txt"), b"").unwrap();
        std::fs::write(src.path().join("report.pdf.bak"), b"").unwrap();
        std::fs::create_dir(src.path().join("folder.pdf")).unwrap();

        let names: Vec<String> = discover_documents(src.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, ["A.PDF", "b.pdf"]);
    }

    #[test]
    fn empty_directory_still_creates_ledger() {
        let (src, out) = setup();
        let dest = out.path().join("ledger.xlsx");

        let summary = run(&IngestConfig::new(src.path(), &dest), &NullProgress).unwrap();

        assert_eq!(summary.documents, 0);
        assert!(dest.exists());
        assert!(read_rows(&dest).unwrap().is_empty());
    }

    #[test]
    fn invalid_config_fails_before_processing() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("ledger.xlsx");
        let config = IngestConfig::new(out.path().join("missing"), &dest);

        assert!(matches!(
            run(&config, &NullProgress),
            Err(IngestError::Config(_))
        ));
        assert!(!dest.exists());
    }
}
