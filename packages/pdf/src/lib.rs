#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page-level text extraction from dividend statement PDFs.
//!
//! Broker statements put the dividend line on a fixed page, so the reader
//! only ever hands back the raw text of one page. Text extraction is pure
//! Rust ([`pdf_extract`]); the document is read into memory, decoded page by
//! page, and dropped before the next one is opened.
//!
//! The primary entry point is [`read_target_page`].

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

use std::any::Any;
use std::panic::UnwindSafe;
use std::path::{Path, PathBuf};

/// 1-based page that carries the dividend details on every statement.
pub const TARGET_PAGE: usize = 3;

/// Errors raised while reading a statement.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The file could not be opened or is not a parseable PDF.
    #[error("unreadable document {}: {reason}", path.display())]
    Unreadable {
        /// Path of the offending document.
        path: PathBuf,
        /// Underlying I/O or PDF backend failure.
        reason: String,
    },

    /// The document is too short to contain the requested page.
    #[error("document has {pages} page(s), need at least {required}")]
    InsufficientPages {
        /// Number of pages the document actually has.
        pages: usize,
        /// Minimum number of pages needed.
        required: usize,
    },
}

impl PdfError {
    fn unreadable(path: &Path, reason: impl ToString) -> Self {
        Self::Unreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Extracts the text of every page in the document at `path`.
///
/// # Errors
///
/// Returns [`PdfError::Unreadable`] if the file cannot be read or the PDF
/// backend fails to decode it.
pub fn read_pages(path: &Path) -> Result<Vec<String>, PdfError> {
    let bytes = std::fs::read(path).map_err(|e| PdfError::unreadable(path, e))?;

    log::trace!("Read {} bytes from {}", bytes.len(), path.display());

    decode_guarded(path, || pdf_extract::extract_text_from_mem_by_pages(&bytes))
}

/// Runs a PDF backend call, reporting both its error and any panic it
/// raises as [`PdfError::Unreadable`].
///
/// `pdf-extract` panics on some malformed inputs instead of returning `Err`.
fn decode_guarded<F, E>(path: &Path, decode: F) -> Result<Vec<String>, PdfError>
where
    F: FnOnce() -> Result<Vec<String>, E> + UnwindSafe,
    E: std::fmt::Display,
{
    match std::panic::catch_unwind(decode) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PdfError::unreadable(path, e)),
        Err(payload) => Err(PdfError::unreadable(
            path,
            format!("PDF backend panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Returns the number of pages in the document at `path`.
///
/// # Errors
///
/// Returns [`PdfError::Unreadable`] if the document cannot be decoded.
pub fn page_count(path: &Path) -> Result<usize, PdfError> {
    read_pages(path).map(|pages| pages.len())
}

/// Returns the raw text of the 1-based `page` of the document at `path`.
///
/// # Errors
///
/// * [`PdfError::Unreadable`] if the document cannot be decoded
/// * [`PdfError::InsufficientPages`] if the document has fewer than `page`
///   pages (page `0` never exists)
pub fn read_page(path: &Path, page: usize) -> Result<String, PdfError> {
    let mut pages = read_pages(path)?;

    if page == 0 || pages.len() < page {
        return Err(PdfError::InsufficientPages {
            pages: pages.len(),
            required: page.max(1),
        });
    }

    let text = pages.swap_remove(page - 1);

    log::debug!("Text from page {page} of {}:\n{text}", path.display());

    Ok(text)
}

/// Returns the raw text of [`TARGET_PAGE`] of the document at `path`.
///
/// # Errors
///
/// * [`PdfError::Unreadable`] if the document cannot be decoded
/// * [`PdfError::InsufficientPages`] if the document has fewer than
///   [`TARGET_PAGE`] pages
pub fn read_target_page(path: &Path) -> Result<String, PdfError> {
    read_page(path, TARGET_PAGE)
}
