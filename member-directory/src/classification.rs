//! Enumerated classification of free-text answers.
//!
//! Both the consent answer and the membership type are free text typed by
//! staff into the spreadsheet. They are normalized with [`normalize`] and then
//! mapped onto closed enums, so the three-way publishing policy can be audited
//! in one place.

use serde::Serialize;

/// Normalizes a raw cell for matching: surrounding whitespace is trimmed and
/// the remainder is lowercased (Unicode-aware).
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Publishing outcome for one member record.
///
/// Computed once per record from the consent answer and never changed
/// afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// The member agreed to a public profile. All data is published.
    Public,
    /// The member has not answered yet. Identity and categorical columns are
    /// published, personal columns are masked.
    Pending,
    /// The member refused. Nothing is published; the record is only counted.
    Excluded,
}

impl Disposition {
    /// Classifies a consent answer.
    ///
    /// Rules, first match wins on the normalized value:
    /// 1. starts with `oui` → [`Disposition::Public`]
    /// 2. starts with `non` → [`Disposition::Excluded`]
    /// 3. anything else, including empty → [`Disposition::Pending`]
    #[must_use]
    pub fn from_consent(raw: &str) -> Self {
        let consent = normalize(raw);
        if consent.starts_with("oui") {
            Self::Public
        } else if consent.starts_with("non") {
            Self::Excluded
        } else {
            Self::Pending
        }
    }

    /// Short lowercase label, used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Pending => "pending",
            Self::Excluded => "excluded",
        }
    }
}

/// Membership category used to break down excluded statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    /// `Régulier` members.
    Regular,
    /// `Étudiant` members.
    Student,
    /// `Partenaire` members.
    Partner,
    /// Anything else, including an empty cell.
    Other,
}

impl MembershipType {
    /// Classifies a membership-type cell by substring on the normalized value.
    ///
    /// Categories are checked in order (regular, student, partner) and the
    /// accent-free spellings are accepted for the first two.
    #[must_use]
    pub fn from_field(raw: &str) -> Self {
        let kind = normalize(raw);
        if kind.contains("régulier") || kind.contains("regulier") {
            Self::Regular
        } else if kind.contains("étudiant") || kind.contains("etudiant") {
            Self::Student
        } else if kind.contains("partenaire") {
            Self::Partner
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize, Disposition, MembershipType};

    #[test]
    fn normalize_trims_and_folds_case() {
        assert_eq!(normalize("  OUI, j'accepte \t"), "oui, j'accepte");
        assert_eq!(normalize("Étudiant"), "étudiant");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn consent_prefixes_pick_disposition() {
        assert_eq!(Disposition::from_consent("Oui"), Disposition::Public);
        assert_eq!(
            Disposition::from_consent("  oui, sans problème"),
            Disposition::Public
        );
        assert_eq!(Disposition::from_consent("NON"), Disposition::Excluded);
        assert_eq!(
            Disposition::from_consent("Non merci"),
            Disposition::Excluded
        );
    }

    #[test]
    fn unrecognized_consent_is_pending() {
        for raw in ["", "   ", "peut-être", "o", "yes", "no", "Je ne sais pas"] {
            assert_eq!(Disposition::from_consent(raw), Disposition::Pending, "{raw:?}");
        }
    }

    #[test]
    fn prefix_is_matched_not_substring() {
        // "non" appears inside the answer but not at the start
        assert_eq!(
            Disposition::from_consent("Pas encore, non"),
            Disposition::Pending
        );
    }

    #[test]
    fn membership_type_matches_substrings_in_order() {
        assert_eq!(MembershipType::from_field("Régulier"), MembershipType::Regular);
        assert_eq!(
            MembershipType::from_field("Membre regulier"),
            MembershipType::Regular
        );
        assert_eq!(
            MembershipType::from_field("ÉTUDIANT.E"),
            MembershipType::Student
        );
        assert_eq!(
            MembershipType::from_field("etudiant"),
            MembershipType::Student
        );
        assert_eq!(
            MembershipType::from_field("Organisme partenaire"),
            MembershipType::Partner
        );
        // regular wins over student when both appear
        assert_eq!(
            MembershipType::from_field("Régulier (ancien étudiant)"),
            MembershipType::Regular
        );
    }

    #[test]
    fn unknown_membership_type_is_other() {
        assert_eq!(MembershipType::from_field(""), MembershipType::Other);
        assert_eq!(MembershipType::from_field("Honoraire"), MembershipType::Other);
    }
}
