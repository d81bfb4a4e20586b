//! The export pass: classify, mask, count, assemble.
//!
//! One synchronous fold over the input rows. Each row is classified exactly
//! once; public rows are kept as-is, pending rows are masked, excluded rows
//! only bump the statistics. The statistics row is rendered at write time,
//! after every input row has been visited.

use std::{io, iter};

use slog::{debug, info, o, trace, warn, Discard, Logger};

use crate::{
    classification::{Disposition, MembershipType},
    error::{ExportError, Result},
    redaction::{ExportPolicy, MemberRecord, Redactable},
    slog::IntoRedactedJson,
    stats::ExcludedStats,
    table::{csv_writer, Table},
};

/// Runs exports under one policy.
#[derive(Clone, Debug)]
pub struct Exporter {
    policy: ExportPolicy,
    logger: Logger,
}

impl Exporter {
    /// Creates an exporter that logs nowhere.
    #[must_use]
    pub fn new(policy: ExportPolicy) -> Self {
        Self {
            policy,
            logger: Logger::root(Discard, o!()),
        }
    }

    /// Sends progress and warnings to `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger.new(o!("policy" => self.policy.version.clone()));
        self
    }

    /// The policy this exporter applies.
    #[must_use]
    pub fn policy(&self) -> &ExportPolicy {
        &self.policy
    }

    /// Fails if a column the classifier depends on is missing from `headers`.
    pub fn check_columns(&self, headers: &[String]) -> Result<()> {
        for column in self.policy.schema.required_columns() {
            if !headers.iter().any(|header| header == column) {
                return Err(ExportError::MissingColumn {
                    column: column.to_owned(),
                    available: headers.to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Classifies every row of `table` and returns the assembled export.
    ///
    /// The policy and the header row are checked before any row is visited,
    /// so a failure here leaves nothing half-done.
    pub fn run(&self, table: &Table) -> Result<Export> {
        self.policy.validate()?;
        self.check_columns(table.headers())?;

        let schema = &self.policy.schema;
        if !table.headers().contains(&schema.email) {
            warn!(self.logger, "email column missing, statistics counts will not be written";
                "column" => &schema.email);
        }

        let mut public = Vec::new();
        let mut pending = Vec::new();
        let mut stats = ExcludedStats::default();

        for (index, row) in table.rows().iter().enumerate() {
            // header is line 1
            let line = index + 2;
            if !row.has_identity(schema) {
                debug!(self.logger, "skipping row without a name"; "line" => line);
                continue;
            }

            let disposition = Disposition::from_consent(row.get(&schema.consent));
            trace!(self.logger, "classified";
                "line" => line,
                "disposition" => disposition.as_str());
            match disposition {
                Disposition::Public => public.push(row.clone()),
                Disposition::Pending => {
                    let masked = row.redacted(&self.policy);
                    debug!(self.logger, "masked pending member";
                        "line" => line,
                        "record" => masked.clone().into_redacted_json(&self.policy));
                    pending.push(masked);
                }
                Disposition::Excluded => {
                    stats.record(MembershipType::from_field(row.get(&schema.membership_type)));
                }
            }
        }

        let export = Export {
            headers: table.headers().to_vec(),
            policy: self.policy.clone(),
            public,
            pending,
            stats,
        };
        let summary = export.summary();
        info!(self.logger, "export assembled";
            "public" => summary.public,
            "pending_with_form" => summary.pending_with_form,
            "pending_without_form" => summary.pending_without_form,
            "excluded" => stats);
        Ok(export)
    }
}

/// The classified rows of one run, ready to serialize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    headers: Vec<String>,
    policy: ExportPolicy,
    public: Vec<MemberRecord>,
    pending: Vec<MemberRecord>,
    stats: ExcludedStats,
}

impl Export {
    /// Consenting members, unchanged, in input order.
    #[must_use]
    pub fn public(&self) -> &[MemberRecord] {
        &self.public
    }

    /// Members without an answer, masked, in input order.
    #[must_use]
    pub fn pending(&self) -> &[MemberRecord] {
        &self.pending
    }

    /// Tally of refusing members.
    #[must_use]
    pub fn stats(&self) -> ExcludedStats {
        self.stats
    }

    /// Header row the output is written with.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All output records in order: public, pending, then the statistics row.
    pub fn records(&self) -> impl Iterator<Item = MemberRecord> + '_ {
        self.public
            .iter()
            .chain(&self.pending)
            .cloned()
            .chain(iter::once(self.stats.to_record(&self.policy)))
    }

    /// Counts for reporting.
    ///
    /// A pending member counts as having filled in the profile form when the
    /// policy's `form_filled` column is non-empty.
    #[must_use]
    pub fn summary(&self) -> ExportSummary {
        let form_column = &self.policy.schema.form_filled;
        let pending_with_form = self
            .pending
            .iter()
            .filter(|record| !record.get(form_column).trim().is_empty())
            .count();
        ExportSummary {
            public: self.public.len(),
            pending_with_form,
            pending_without_form: self.pending.len() - pending_with_form,
            excluded: self.stats.total,
        }
    }

    /// Writes the header row and every output record.
    ///
    /// Each record is projected onto the header row: fields outside it are
    /// dropped and headers without a value are written empty.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut out = csv_writer(writer);
        out.write_record(&self.headers)?;
        for record in self.records() {
            out.write_record(self.headers.iter().map(|header| record.get(header)))?;
        }
        out.flush().map_err(|err| ExportError::Csv(err.into()))?;
        Ok(())
    }

    /// Serializes the whole export in memory.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }
}

/// Per-run counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Rows published with real data.
    pub public: usize,
    /// Pending rows whose profile form is filled in.
    pub pending_with_form: usize,
    /// Pending rows with no profile form.
    pub pending_without_form: usize,
    /// Rows left out of the output.
    pub excluded: u64,
}

impl ExportSummary {
    /// Pending rows, form or not.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending_with_form + self.pending_without_form
    }
}
