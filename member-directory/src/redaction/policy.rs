//! The export policy: which columns matter, which are personal data, and what
//! replaces them.
//!
//! Rules are pure string transformations. They do not look at the record,
//! pick dispositions, or decide sensitivity at runtime; the policy value
//! decides all of that up front.

use std::{borrow::Cow, collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Identifier of the built-in policy returned by [`ExportPolicy::default`].
pub const POLICY_VERSION: &str = "rsn-v1";

/// What a sensitive column becomes in a pending record.
///
/// Serialized as `"clear"` or `{"placeholder": "<text>"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionRule {
    /// Replace the value with the empty string.
    #[default]
    Clear,
    /// Replace the value with a fixed substitute.
    Placeholder(Cow<'static, str>),
}

impl RedactionRule {
    /// Constructs [`RedactionRule::Placeholder`].
    #[must_use]
    pub fn placeholder<P>(text: P) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self::Placeholder(text.into())
    }

    /// Applies the rule to `value`.
    ///
    /// The original value never influences the result, so the output carries
    /// nothing of it.
    #[must_use]
    pub fn apply_to(&self, _value: &str) -> String {
        match self {
            Self::Clear => String::new(),
            Self::Placeholder(text) => text.clone().into_owned(),
        }
    }
}

/// A column holding personal data, with the rule that masks it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveField {
    /// Header name of the column.
    pub column: String,
    /// Replacement applied to pending records.
    #[serde(default)]
    pub rule: RedactionRule,
}

impl SensitiveField {
    /// A column that is cleared when masked.
    #[must_use]
    pub fn cleared(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            rule: RedactionRule::Clear,
        }
    }

    /// A column that receives a fixed placeholder when masked.
    #[must_use]
    pub fn replaced(column: impl Into<String>, placeholder: &'static str) -> Self {
        Self {
            column: column.into(),
            rule: RedactionRule::placeholder(placeholder),
        }
    }
}

/// Column names the classifier and the statistics row rely on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Schema {
    /// First name. Required.
    pub first_name: String,
    /// Last name. Required.
    pub last_name: String,
    /// Primary email. Carries the packed counts on the statistics row.
    pub email: String,
    /// Membership type. Drives the excluded breakdown.
    pub membership_type: String,
    /// Consent answer. Required.
    pub consent: String,
    /// First interest axis. Non-empty once a pending member filled in the
    /// profile form.
    pub form_filled: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            first_name: "Prénom".into(),
            last_name: "Nom de la famille".into(),
            email: "E-mail / Courriel".into(),
            membership_type: "Type d'adhesion".into(),
            consent: "Autorisez-vous le RSN à vous créer un profil de membre public".into(),
            form_filled: "1e Axe d'intérêt".into(),
        }
    }
}

impl Schema {
    /// Columns that must be present in the header row before any row is read.
    #[must_use]
    pub fn required_columns(&self) -> [&str; 3] {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.consent.as_str(),
        ]
    }
}

/// One complete, versioned publishing policy.
///
/// Missing keys in a JSON policy fall back to the built-in values, so a policy
/// file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportPolicy {
    /// Free-form version label, logged with every run.
    pub version: String,
    /// Column names used by the classifier.
    pub schema: Schema,
    /// Personal-data columns masked on pending records, in masking order.
    pub sensitive: Vec<SensitiveField>,
    /// Structural/categorical columns that filters depend on and that must
    /// never be masked.
    pub protected: Vec<String>,
    /// First-name value that identifies the statistics row.
    pub stats_marker: String,
    /// Consent value written on the statistics row.
    pub stats_tag: String,
}

impl Default for ExportPolicy {
    fn default() -> Self {
        let schema = Schema::default();
        let sensitive = vec![
            SensitiveField::replaced(schema.email.clone(), "membre@rsn-placeholder.ca"),
            SensitiveField::cleared("Autre courriel"),
            SensitiveField::replaced("Statut actuel", "Non divulgué"),
            SensitiveField::replaced("Institution / organisation 1", "Institution non divulguée"),
            SensitiveField::cleared("Réseau 1"),
            SensitiveField::cleared("Expertise"),
            SensitiveField::cleared("Thèmes d'intérêt"),
            SensitiveField::cleared("Projet de recherche"),
            SensitiveField::cleared("Étudiant.e.s"),
            SensitiveField::cleared("Référée par"),
            SensitiveField::cleared("Droit de vote"),
            SensitiveField::cleared("ORCID"),
            SensitiveField::cleared("CV / LinkedIn"),
            SensitiveField::cleared("Évaluateur du RSN - nouv. formulaire"),
        ];
        let protected = [
            "1e Axe d'intérêt",
            "2e Axe d'intérêt",
            "3e Axe d'intérêt",
            "Principes fondateurs",
            "Champs d'action",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            version: POLICY_VERSION.into(),
            schema,
            sensitive,
            protected,
            stats_marker: "__STATS_EXCLUDED__".into(),
            stats_tag: "stats".into(),
        }
    }
}

impl ExportPolicy {
    /// Parses and validates a JSON policy document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let policy: Self =
            serde_json::from_str(json).map_err(|err| ExportError::Policy(err.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reads, parses, and validates a JSON policy file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| ExportError::io(path, err))?;
        Self::from_json_str(&json)
    }

    /// Returns the rule for `column` if it is sensitive.
    #[must_use]
    pub fn rule_for(&self, column: &str) -> Option<&RedactionRule> {
        self.sensitive
            .iter()
            .find(|field| field.column == column)
            .map(|field| &field.rule)
    }

    /// Checks the invariants a policy must hold before it is used.
    ///
    /// - every column name is non-empty
    /// - the name, email, membership-type, and consent columns are distinct
    /// - no column is listed twice as sensitive
    /// - the sensitive set is disjoint from the protected columns and from the
    ///   name, consent, and membership-type columns
    /// - the statistics marker is non-empty
    pub fn validate(&self) -> Result<()> {
        let schema = &self.schema;
        let schema_columns = [
            &schema.first_name,
            &schema.last_name,
            &schema.email,
            &schema.membership_type,
            &schema.consent,
        ];
        if schema_columns.iter().any(|column| column.trim().is_empty())
            || schema.form_filled.trim().is_empty()
        {
            return Err(ExportError::Policy(
                "schema column names must not be empty".into(),
            ));
        }
        let mut distinct = HashSet::new();
        for column in schema_columns {
            if !distinct.insert(column.as_str()) {
                return Err(ExportError::Policy(format!(
                    "column '{column}' is used for more than one schema role"
                )));
            }
        }
        if self.stats_marker.trim().is_empty() {
            return Err(ExportError::Policy(
                "statistics marker must not be empty".into(),
            ));
        }

        let never_masked: HashSet<&str> = self
            .protected
            .iter()
            .map(String::as_str)
            .chain([
                schema.first_name.as_str(),
                schema.last_name.as_str(),
                schema.membership_type.as_str(),
                schema.consent.as_str(),
            ])
            .collect();

        let mut seen = HashSet::new();
        for field in &self.sensitive {
            let column = field.column.as_str();
            if column.trim().is_empty() {
                return Err(ExportError::Policy(
                    "sensitive column names must not be empty".into(),
                ));
            }
            if !seen.insert(column) {
                return Err(ExportError::Policy(format!(
                    "column '{column}' is listed as sensitive more than once"
                )));
            }
            if never_masked.contains(column) {
                return Err(ExportError::Policy(format!(
                    "column '{column}' is used for filtering and cannot be sensitive"
                )));
            }
        }
        Ok(())
    }
}
