use std::path::Path;
use std::sync::Arc;

use kbsync_domain::{
    ConfigurationError, GraphqlService, Infrastructure, Record, Reporter, RowSource, RunTally,
    TransferConfig,
};
use strum_macros::Display;
use tracing::{debug, info, warn};

use crate::mutation::{classify, created_project, Mutation};
use crate::throttle::Throttle;

/// Where a run currently is; only used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RunPhase {
    Reading,
    Dispatching,
    Reporting,
    Done,
}

/// Reads records from a file and sends one mutation per record, strictly in
/// file order.
pub struct BulkTransferRunner<F, M> {
    infra: Arc<F>,
    mutation: M,
    throttle: Throttle,
    project_id: Option<String>,
}

impl<F: Infrastructure, M: Mutation> BulkTransferRunner<F, M> {
    pub fn new(infra: Arc<F>, mutation: M, config: &TransferConfig) -> Self {
        Self {
            infra,
            mutation,
            throttle: Throttle::new(config.throttle.clone()),
            project_id: config.project_id.clone(),
        }
    }

    /// Transfers every record of `path`. Only a [`ConfigurationError`] ends
    /// the run early, and only before the first dispatch.
    pub async fn run(
        &self,
        path: &Path,
        reporter: &dyn Reporter,
    ) -> Result<RunTally, ConfigurationError> {
        let kind = M::Record::NAME;
        debug!(phase = %RunPhase::Reading, path = %path.display(), kind, "Opening input");
        let rows = self
            .infra
            .row_source()
            .open(path, M::Record::REQUIRED_COLUMNS)?;

        reporter.started(kind, path);
        let mut tally = RunTally::new();
        let mut last_dispatched = 0;

        for row in rows {
            let parsed = row.and_then(|row| {
                let record = M::Record::from_row(&row)?;
                Ok((row.position(), record))
            });
            let (position, record) = match parsed {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!(position = error.position, reason = %error.reason, "Skipping row");
                    tally.record_skipped();
                    reporter.skipped(&error);
                    continue;
                }
            };

            self.throttle.wait_before(last_dispatched, position).await;
            last_dispatched = position;

            let label = record.label();
            debug!(phase = %RunPhase::Dispatching, position, label = %label, "Dispatching record");
            let response = self
                .infra
                .graphql_service()
                .execute(&self.mutation.operation(&record))
                .await;

            if let (Some(expected), Ok(response)) = (self.project_id.as_deref(), &response) {
                match created_project(M::FIELD, response) {
                    Some(actual) if actual != expected.trim() => {
                        warn!(position, expected, actual = %actual, "Created in a different project")
                    }
                    _ => {}
                }
            }

            let result = classify(M::FIELD, response);
            if !result.is_success() {
                warn!(position, outcome = %result.outcome(), detail = result.detail(), "Record failed");
            }
            reporter.dispatched(position, &label, &result);
            tally.record(&result);
        }

        debug!(phase = %RunPhase::Reporting, "All rows consumed");
        reporter.finished(kind, &tally);
        info!(
            phase = %RunPhase::Done,
            kind,
            total = tally.total(),
            succeeded = tally.succeeded(),
            failed = tally.failed(),
            "Transfer finished"
        );
        Ok(tally)
    }
}
