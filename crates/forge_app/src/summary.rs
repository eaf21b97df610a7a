use std::path::PathBuf;

use tracing::{info, warn};

use crate::pipeline::DocumentFailure;

/// Outcome of one batch run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Documents that produced a sheet, in processing order.
    pub processed: Vec<String>,
    pub failures: Vec<DocumentFailure>,
    pub total_cases: usize,
    /// Set only when a workbook was written.
    pub output: Option<PathBuf>,
    pub manual_min_per_test: u32,
    pub ai_min_per_test: u32,
}

impl RunSummary {
    /// Estimated minutes saved versus writing the cases by hand.
    pub fn minutes_saved(&self) -> u64 {
        let per_case = self.manual_min_per_test.saturating_sub(self.ai_min_per_test);
        self.total_cases as u64 * u64::from(per_case)
    }

    pub fn log(&self) {
        match &self.output {
            Some(path) => info!(
                path = %path.display(),
                documents = self.processed.len(),
                failed = self.failures.len(),
                test_cases = self.total_cases,
                minutes_saved = self.minutes_saved(),
                "Run complete"
            ),
            None => warn!(
                failed = self.failures.len(),
                "No document was processed successfully; no workbook written"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_saved_uses_per_case_difference() {
        let summary = RunSummary {
            total_cases: 10,
            manual_min_per_test: 15,
            ai_min_per_test: 2,
            ..RunSummary::default()
        };
        assert_eq!(summary.minutes_saved(), 130);
    }

    #[test]
    fn minutes_saved_never_negative() {
        let summary = RunSummary {
            total_cases: 4,
            manual_min_per_test: 1,
            ai_min_per_test: 5,
            ..RunSummary::default()
        };
        assert_eq!(summary.minutes_saved(), 0);
    }
}
