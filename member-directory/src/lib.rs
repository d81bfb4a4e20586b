//! Consent-driven redaction of a membership spreadsheet into a public directory feed.
//!
//! This crate separates:
//! - **Classification**: which disposition a member record gets from its consent answer.
//! - **Policy**: which columns are personal data and what replaces them.
//! - **Export**: the single pass that routes each record to the public segment,
//!   the masked pending segment, or the excluded statistics.
//!
//! The built-in [`ExportPolicy`] is one fixed policy version. Every core
//! function takes the policy explicitly, so substitute policies can be loaded
//! from JSON and tested in isolation.
//!
//! Key rules:
//! - Consent starting with `oui` is public and passes through unchanged.
//! - Consent starting with `non` is excluded and only counted.
//! - Anything else is pending: names and categorical columns stay, sensitive
//!   columns are replaced with placeholders.
//! - Rows with neither a first nor a last name are not members and are skipped.
//!
//! What this crate does:
//! - reads and writes delimited tables (UTF-8 with a Latin-1 fallback)
//! - extracts spreadsheets with hyperlink targets substituted (feature `xlsx`)
//! - provides `slog` values that only ever log the redacted form of a record
//!
//! What it does not do:
//! - parse command-line arguments or pick default paths
//! - print console reports

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod classification;
mod error;
mod export;
mod redaction;
pub mod slog;
#[cfg(feature = "xlsx")]
pub mod spreadsheet;
mod stats;
mod table;

// Re-exports
pub use classification::{normalize, Disposition, MembershipType};
pub use error::{ExportError, Result};
pub use export::{Export, ExportSummary, Exporter};
pub use redaction::{
    ExportPolicy, MemberRecord, Redactable, RedactionRule, Schema, SensitiveField,
    POLICY_VERSION,
};
pub use stats::ExcludedStats;
pub use table::{write_grid, Table, TextEncoding};
