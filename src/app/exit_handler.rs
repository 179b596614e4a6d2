//! Exit code logic for the `imgur` process.
//!
//! Single responsibility: map run counters to the process exit outcome.

use imgur_downloader::CrawlStats;

use crate::ProcessExit;

/// Determines the process exit outcome from success and failure counts.
pub(crate) fn determine_exit_outcome(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

/// Exit outcome for a finished crawl; an interrupted run is always a failure.
pub(crate) fn exit_outcome_for_stats(stats: &CrawlStats) -> ProcessExit {
    if stats.was_interrupted() {
        return ProcessExit::Failure;
    }
    determine_exit_outcome(stats.successes(), stats.failures())
}
