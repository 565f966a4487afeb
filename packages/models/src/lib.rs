#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the dividend ledger toolchain.
//!
//! A [`DividendRecord`] is produced by the field extractor from the text of
//! a single statement page and consumed by the store appender, which writes
//! it as one spreadsheet row. [`Field`] names each of the four extracted
//! values and [`AmbiguityPolicy`] controls what happens when a page offers
//! more than one candidate for a field.

pub mod progress;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// One dividend event pulled from a statement page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendRecord {
    /// Payment date exactly as printed, e.g. `15Mar24`.
    pub date: String,
    /// Issuer name including its corporate suffix, e.g. `Acme Holdings PLC`.
    pub issuer_name: String,
    /// Holding and per-share rate in `quantity@rate` form, e.g. `500@0.25`.
    pub dividend_detail: String,
    /// Net amount credited.
    pub amount: f64,
}

/// The four fields a statement page must yield.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// `DDMonYY` payment date.
    #[strum(serialize = "date")]
    Date,
    /// Issuer name ending in a corporate suffix.
    #[strum(serialize = "issuer name")]
    IssuerName,
    /// `quantity@rate` holding detail.
    #[strum(serialize = "dividend detail")]
    DividendDetail,
    /// Amount following the `Dividend` label.
    #[strum(serialize = "amount")]
    Amount,
}

/// How the extractor resolves a field that matches more than once on a
/// page.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Take the first candidate scanning top to bottom, left to right.
    #[default]
    FirstMatch,
    /// Refuse the page when a field has more than one distinct candidate.
    Reject,
}
