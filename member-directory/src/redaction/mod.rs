//! Redaction policy and masking.
//!
//! - **`policy`**: Policy layer - what is sensitive and how it is replaced (`ExportPolicy`)
//! - **`sensitive`**: Domain layer - records and their masked form (`MemberRecord`, `Redactable`)

mod policy;
mod sensitive;

pub use policy::{ExportPolicy, RedactionRule, Schema, SensitiveField, POLICY_VERSION};
pub use sensitive::{MemberRecord, Redactable};
