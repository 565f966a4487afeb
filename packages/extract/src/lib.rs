#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dividend field extraction from statement page text.
//!
//! Four independent patterns are searched against the whole page:
//!
//! | Field | Pattern | Example |
//! |---|---|---|
//! | date | two digits, three letters, two digits | `15Mar24` |
//! | issuer name | letters, spaces, `&`, `-` ending in a corporate suffix | `Acme Holdings PLC` |
//! | dividend detail | `quantity@rate` | `500@0.25` |
//! | amount | `Dividend` then whitespace then a decimal | `Dividend 125.00` |
//!
//! A page yields a [`DividendRecord`] only when all four match. When a field
//! has several candidates the [`AmbiguityPolicy`] decides: the legacy
//! behaviour takes the first one in reading order, the strict behaviour
//! refuses the page so it can be reviewed by hand.

use std::sync::LazyLock;

use dividend_ledger_models::{AmbiguityPolicy, DividendRecord, Field};
use regex::Regex;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}[A-Za-z]{3}\d{2}").expect("valid regex"));

/// Corporate suffixes that terminate an issuer name.
static ISSUER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z\s&-]+(?:Ltd|PLC|Inc|Corp|Co|Group)\b").expect("valid regex")
});

static DETAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+@\d+\.\d+").expect("valid regex"));

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Dividend\s(\d+\.\d+)").expect("valid regex"));

static DECIMAL_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("valid regex"));

/// Reasons a page does not yield a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// One or more required fields are absent from the page.
    #[error("missing {}", join_fields(missing))]
    Incomplete {
        /// Every field that did not match, in column order.
        missing: Vec<Field>,
    },

    /// A field matched several distinct values and the policy is
    /// [`AmbiguityPolicy::Reject`].
    #[error("ambiguous {field}: {}", candidates.join(", "))]
    Ambiguous {
        /// The first field (in column order) found to be ambiguous.
        field: Field,
        /// Distinct candidate values in reading order.
        candidates: Vec<String>,
    },
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(", ")
}

/// Outcome of searching the page for a single field.
enum Resolution {
    Missing,
    Found(String),
    Ambiguous(Vec<String>),
}

/// Returns every candidate value for `field` in reading order.
///
/// Issuer names are trimmed, amounts are the captured decimal without the
/// `Dividend` label.
#[must_use]
pub fn candidates(text: &str, field: Field) -> Vec<String> {
    matches(text, field).collect()
}

/// Lazily yields the candidate values for `field` in reading order.
fn matches<'t>(text: &'t str, field: Field) -> Box<dyn Iterator<Item = String> + 't> {
    fn owned(m: regex::Match<'_>) -> String {
        m.as_str().to_owned()
    }

    match field {
        Field::Date => Box::new(DATE_RE.find_iter(text).map(owned)),
        Field::IssuerName => Box::new(
            ISSUER_RE
                .find_iter(text)
                .map(|m| m.as_str().trim().to_owned()),
        ),
        Field::DividendDetail => Box::new(DETAIL_RE.find_iter(text).map(owned)),
        Field::Amount => Box::new(
            AMOUNT_RE
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(owned),
        ),
    }
}

/// Maps any Unicode decimal digit to its ASCII counterpart.
///
/// Decimal digits are encoded in contiguous runs of ten, zero first, so a
/// digit's value is its distance from the start of its run modulo ten.
fn ascii_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        return Some(c);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let code = u32::from(c);
    let mut start = code;
    while start
        .checked_sub(1)
        .and_then(char::from_u32)
        .is_some_and(is_decimal_digit)
    {
        start -= 1;
    }

    char::from_digit((code - start) % 10, 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0; 4];
    DECIMAL_DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

/// Parses an amount the pattern accepted, whatever script its digits use.
fn parse_amount(raw: &str) -> Option<f64> {
    let ascii = raw
        .chars()
        .map(|c| if c == '.' { Some(c) } else { ascii_digit(c) })
        .collect::<Option<String>>()?;
    ascii.parse().ok()
}

fn resolve(text: &str, field: Field, policy: AmbiguityPolicy) -> Resolution {
    match policy {
        AmbiguityPolicy::FirstMatch => matches(text, field)
            .next()
            .map_or(Resolution::Missing, Resolution::Found),
        AmbiguityPolicy::Reject => {
            let mut distinct: Vec<String> = Vec::new();
            for candidate in candidates(text, field) {
                if !distinct.contains(&candidate) {
                    distinct.push(candidate);
                }
            }
            match distinct.len() {
                0 => Resolution::Missing,
                1 => Resolution::Found(distinct.swap_remove(0)),
                _ => Resolution::Ambiguous(distinct),
            }
        }
    }
}

/// Extracts a [`DividendRecord`] from the text of a statement page.
///
/// # Errors
///
/// * [`ExtractError::Incomplete`] if any of the four fields is absent
/// * [`ExtractError::Ambiguous`] if `policy` is [`AmbiguityPolicy::Reject`]
///   and a field has more than one distinct candidate
pub fn extract(text: &str, policy: AmbiguityPolicy) -> Result<DividendRecord, ExtractError> {
    let mut missing = Vec::new();
    let mut ambiguous = None;

    let mut take = |field: Field| match resolve(text, field, policy) {
        Resolution::Found(value) => Some(value),
        Resolution::Missing => {
            missing.push(field);
            None
        }
        Resolution::Ambiguous(candidates) => {
            ambiguous.get_or_insert((field, candidates));
            None
        }
    };

    let date = take(Field::Date);
    let issuer_name = take(Field::IssuerName);
    let dividend_detail = take(Field::DividendDetail);
    let raw_amount = take(Field::Amount);

    // A decimal the pattern accepted but f64 rejects counts as absent.
    let amount = raw_amount.as_deref().and_then(parse_amount);
    if raw_amount.is_some() && amount.is_none() {
        missing.push(Field::Amount);
    }

    let (Some(date), Some(issuer_name), Some(dividend_detail), Some(amount)) =
        (date, issuer_name, dividend_detail, amount)
    else {
        return Err(match ambiguous {
            Some((field, candidates)) if missing.is_empty() => {
                ExtractError::Ambiguous { field, candidates }
            }
            _ => ExtractError::Incomplete { missing },
        });
    };

    let record = DividendRecord {
        date,
        issuer_name,
        dividend_detail,
        amount,
    };

    log::debug!(
        "Extracted details - Date: {}, Name: {}, Dividend Details: {}, Amount: {}",
        record.date,
        record.issuer_name,
        record.dividend_detail,
        record.amount
    );

    Ok(record)
}
