use serde::Serialize;

use crate::TransferResult;

/// Run-scoped success/failure counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTally {
    total: usize,
    succeeded: usize,
    failed: usize,
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one dispatch result in.
    pub fn record(&mut self, result: &TransferResult) {
        self.total += 1;
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Counts a row that was skipped before dispatch.
    pub fn record_skipped(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Fraction of successful records, `None` for an empty run.
    pub fn success_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.succeeded as f64 / self.total as f64)
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_tally_has_no_rate() {
        let tally = RunTally::new();
        assert_eq!(tally.success_rate(), None);
        assert!(tally.is_clean());
    }

    #[test]
    fn test_counts_stay_consistent() {
        let mut tally = RunTally::new();
        tally.record(&TransferResult::success("1"));
        tally.record(&TransferResult::exception("connection refused"));
        tally.record_skipped();
        tally.record(&TransferResult::success("2"));

        assert_eq!(tally.total(), 4);
        assert_eq!(tally.succeeded(), 2);
        assert_eq!(tally.failed(), 2);
        assert_eq!(tally.total(), tally.succeeded() + tally.failed());
        assert_eq!(tally.success_rate(), Some(0.5));
        assert!(!tally.is_clean());
    }
}
