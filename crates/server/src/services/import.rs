//! Bulk importer: turns decoded spreadsheet rows into registrations.
//!
//! The import is a best-effort batch. Rows without a name or without any
//! valid contact method are skipped, rows the registrar rejects are logged
//! and skipped, and nothing short of unreadable input aborts the run (that
//! case is caught by the spreadsheet decoder before the importer is called).

use std::fmt;
use std::num::NonZeroUsize;

use chrono::Utc;
use futures::StreamExt;
use futures::stream::FuturesOrdered;
use rollcall_core::{Email, InputRow, Phone, RegisteredUser, RegistrationPayload};

use super::registrar::{Registrar, RegistrarError};
use super::report;

/// Why a row was skipped without calling the registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The name cell is empty or missing.
    MissingName,
    /// Neither the email nor the phone cell holds a valid value.
    NoValidContact,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => f.write_str("missing name"),
            Self::NoValidContact => f.write_str("no valid email or phone"),
        }
    }
}

/// What the importer intends to do with a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowPlan {
    /// Register this payload (only the valid contact fields are kept).
    Register(RegistrationPayload),
    /// Skip the row.
    Skip(SkipReason),
}

/// What happened to a row. Row numbers are 1-based input positions.
#[derive(Debug)]
pub enum RowOutcome {
    Registered(RegisteredUser),
    Skipped {
        row: usize,
        reason: SkipReason,
    },
    Failed {
        row: usize,
        name: String,
        error: RegistrarError,
    },
}

/// Result of one import run.
#[derive(Debug, Clone)]
pub struct BulkResult {
    pub registered_count: usize,
    /// Successful registrations, in input row order.
    pub registered_users: Vec<RegisteredUser>,
    /// Unique file name for this run's report.
    pub output_artifact_name: String,
}

/// Counts of each outcome kind, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub registered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportSummary {
    /// Tally a set of outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            match outcome {
                RowOutcome::Registered(_) => acc.registered += 1,
                RowOutcome::Skipped { .. } => acc.skipped += 1,
                RowOutcome::Failed { .. } => acc.failed += 1,
            }
            acc
        })
    }
}

/// Decide what to do with a row without side effects.
///
/// Invalid contact fields are dropped rather than rejected: a row with a bad
/// email but a good phone registers with the phone only.
#[must_use]
pub fn plan_row(row: &InputRow) -> RowPlan {
    let Some(name) = row.name.as_deref().filter(|name| !name.is_empty()) else {
        return RowPlan::Skip(SkipReason::MissingName);
    };

    let email = row.email.as_deref().and_then(|e| Email::parse(e).ok());
    let phone = row.phone.as_deref().and_then(|p| Phone::parse(p).ok());

    RegistrationPayload::new(name, email, phone)
        .map_or(RowPlan::Skip(SkipReason::NoValidContact), RowPlan::Register)
}

/// Dry run: plan every row without registering anything.
#[must_use]
pub fn preview(rows: &[InputRow]) -> Vec<RowPlan> {
    rows.iter().map(plan_row).collect()
}

/// Runs import batches against a [`Registrar`].
pub struct BulkImporter<'a, R> {
    registrar: &'a R,
    concurrency: NonZeroUsize,
}

impl<'a, R: Registrar> BulkImporter<'a, R> {
    /// Create an importer that registers one row at a time.
    #[must_use]
    pub const fn new(registrar: &'a R) -> Self {
        Self {
            registrar,
            concurrency: NonZeroUsize::MIN,
        }
    }

    /// Allow up to `concurrency` registration calls in flight.
    ///
    /// Outcomes are still returned in input order.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Run the import and build the result.
    pub async fn import(&self, rows: &[InputRow]) -> BulkResult {
        let outcomes = self.process_rows(rows).await;
        let summary = ImportSummary::from_outcomes(&outcomes);

        let registered_users: Vec<RegisteredUser> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                RowOutcome::Registered(user) => Some(user),
                RowOutcome::Skipped { .. } | RowOutcome::Failed { .. } => None,
            })
            .collect();

        let output_artifact_name = report::artifact_name(Utc::now(), &mut rand::rng());

        tracing::info!(
            rows = rows.len(),
            registered = summary.registered,
            skipped = summary.skipped,
            failed = summary.failed,
            artifact = %output_artifact_name,
            "Bulk import completed"
        );

        BulkResult {
            registered_count: registered_users.len(),
            registered_users,
            output_artifact_name,
        }
    }

    /// Process every row, returning one outcome per row in input order.
    pub async fn process_rows(&self, rows: &[InputRow]) -> Vec<RowOutcome> {
        let mut outcomes = Vec::with_capacity(rows.len());
        let mut pending = FuturesOrdered::new();
        let mut remaining = rows.iter().enumerate();

        for (idx, row) in remaining.by_ref().take(self.concurrency.get()) {
            pending.push_back(self.process_row(idx + 1, row));
        }

        // FuturesOrdered yields in push order, so outcomes line up with rows.
        while let Some(outcome) = pending.next().await {
            outcomes.push(outcome);
            if let Some((idx, row)) = remaining.next() {
                pending.push_back(self.process_row(idx + 1, row));
            }
        }

        outcomes
    }

    async fn process_row(&self, row: usize, input: &InputRow) -> RowOutcome {
        let payload = match plan_row(input) {
            RowPlan::Register(payload) => payload,
            RowPlan::Skip(reason) => {
                tracing::debug!(row, %reason, "Skipping row");
                return RowOutcome::Skipped { row, reason };
            }
        };

        let name = payload.name().to_owned();
        match self.registrar.register(payload).await {
            Ok(user) => RowOutcome::Registered(user),
            Err(error) => {
                tracing::warn!(row, name = %name, error = %error, "Failed to register row");
                RowOutcome::Failed { row, name, error }
            }
        }
    }
}
