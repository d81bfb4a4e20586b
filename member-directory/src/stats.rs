//! Aggregate counts for members who refused publication.

use std::ops::Add;

use serde::Serialize;

use crate::{
    classification::MembershipType,
    redaction::{ExportPolicy, MemberRecord},
};

/// Counts of excluded members, broken down by membership type.
///
/// Only the three recognized categories get their own counter; every other
/// type contributes to `total` alone. Merging is associative and `default()`
/// is its identity, so partial tallies can be combined in any grouping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExcludedStats {
    /// Every excluded member.
    pub total: u64,
    /// Excluded `Régulier` members.
    pub regular: u64,
    /// Excluded `Étudiant` members.
    pub student: u64,
    /// Excluded `Partenaire` members.
    pub partner: u64,
}

impl ExcludedStats {
    /// Counts one excluded member of the given type.
    pub fn record(&mut self, kind: MembershipType) {
        self.total += 1;
        match kind {
            MembershipType::Regular => self.regular += 1,
            MembershipType::Student => self.student += 1,
            MembershipType::Partner => self.partner += 1,
            MembershipType::Other => {}
        }
    }

    /// Combines two tallies.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            regular: self.regular + other.regular,
            student: self.student + other.student,
            partner: self.partner + other.partner,
        }
    }

    /// The counters as `total,regular,student,partner`.
    #[must_use]
    pub fn packed(&self) -> String {
        format!(
            "{},{},{},{}",
            self.total, self.regular, self.student, self.partner
        )
    }

    /// Renders the tally as the synthetic row that closes the export.
    ///
    /// The row carries the policy's marker as first name, an empty last name,
    /// the packed counters in the primary email column, and the statistics
    /// tag as consent. Every other column is left for the writer to fill with
    /// empty strings.
    #[must_use]
    pub fn to_record(&self, policy: &ExportPolicy) -> MemberRecord {
        let schema = &policy.schema;
        MemberRecord::new()
            .with(schema.first_name.clone(), policy.stats_marker.clone())
            .with(schema.last_name.clone(), "")
            .with(schema.email.clone(), self.packed())
            .with(schema.consent.clone(), policy.stats_tag.clone())
    }
}

impl Add for ExcludedStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.merge(rhs)
    }
}
