//! Domain layer: member records and their masked form.
//!
//! - [`MemberRecord`]: one spreadsheet row, keyed by header name
//! - [`Redactable`]: produces a masked copy under an [`ExportPolicy`]
//!
//! ## Field Handling
//!
//! | Column | Pending record gets |
//! |--------|---------------------|
//! | Sensitive, with placeholder | the placeholder |
//! | Sensitive, without placeholder | empty string |
//! | Anything else | the original value |
//!
//! Masking never mutates its input. The original record stays available for
//! the caller, and the same record and policy always yield the same output.

use std::collections::{btree_map, BTreeMap};

use serde::Serialize;

use super::policy::{ExportPolicy, Schema};

/// One member row: a mapping from header name to trimmed cell text.
///
/// Missing fields read as the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MemberRecord {
    fields: BTreeMap<String, String>,
}

impl MemberRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `column`, or `""` if the record has no such field.
    #[must_use]
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map_or("", String::as_str)
    }

    /// Whether the record carries a field named `column`, even an empty one.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Sets `column` to `value`, returning the previous value if any.
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.fields.insert(column.into(), value.into())
    }

    /// Builder-style [`MemberRecord::insert`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// Iterates over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.fields.iter()
    }

    /// Number of fields carried by the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the row names a member at all.
    ///
    /// A row with both first and last name blank is not a member and takes
    /// no part in classification.
    #[must_use]
    pub fn has_identity(&self, schema: &Schema) -> bool {
        !self.get(&schema.first_name).trim().is_empty()
            || !self.get(&schema.last_name).trim().is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemberRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MemberRecord {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Types that can produce a masked copy of themselves under a policy.
pub trait Redactable {
    /// Returns a copy in which every sensitive column has been replaced
    /// according to `policy`. `self` is left untouched.
    #[must_use]
    fn redacted(&self, policy: &ExportPolicy) -> Self;
}

impl Redactable for MemberRecord {
    fn redacted(&self, policy: &ExportPolicy) -> Self {
        let mut masked = self.clone();
        for field in &policy.sensitive {
            let replacement = field.rule.apply_to(self.get(&field.column));
            masked.insert(field.column.clone(), replacement);
        }
        masked
    }
}
