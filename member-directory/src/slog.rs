//! Adapters for emitting member data through `slog`.
//!
//! This module connects [`Redactable`] with `slog` by providing `slog::Value`
//! implementations that serialize masked records as structured JSON via
//! `slog`'s nested-value support.
//!
//! It is responsible for:
//! - Ensuring the logged representation of a record is derived from
//!   `Redactable::redacted()`, not from the original value.
//! - Avoiding fallible logging APIs: serialization failures are represented as
//!   placeholder strings rather than propagated as errors.
//!
//! It does not configure `slog` drains; callers hand a `Logger` to
//! [`crate::Exporter::with_logger`].

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    redaction::{ExportPolicy, Redactable},
    stats::ExcludedStats,
};

/// A `slog::Value` that emits an owned masked payload as structured JSON.
///
/// If converting the masked output into a JSON value fails, it falls back to
/// a JSON string value.
pub struct RedactedJson {
    value: JsonValue,
}

impl RedactedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }
}

impl SlogValue for RedactedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts values into a `slog::Value` that logs their masked form as JSON.
///
/// Calling `into_redacted_json` consumes the value, computes
/// `self.redacted(policy)`, and stores the result as a `serde_json::Value`.
/// The original value is never serialized.
///
/// ## Example
/// ```ignore
/// use member_directory::slog::IntoRedactedJson;
///
/// info!(logger, "pending"; "record" => record.into_redacted_json(&policy));
/// ```
pub trait IntoRedactedJson: Redactable + Serialize + Sized {
    /// Masks `self` and returns a `slog::Value` that serializes as JSON.
    ///
    /// If converting the masked output into `serde_json::Value` fails, the
    /// returned value stores a JSON string with the message
    /// `"Failed to serialize redacted value"`.
    fn into_redacted_json(self, policy: &ExportPolicy) -> RedactedJson {
        let redacted = self.redacted(policy);
        let json_value = serde_json::to_value(redacted).unwrap_or_else(|_| {
            JsonValue::String("Failed to serialize redacted value".to_string())
        });
        RedactedJson::new(json_value)
    }
}

impl<T> IntoRedactedJson for T where T: Redactable + Serialize {}

/// Counts carry no personal data and are logged as a nested object.
impl SlogValue for ExcludedStats {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        SlogValue::serialize(&slog::Serde(*self), record, key, serializer)
    }
}
