//! Directive metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported until the
//! application installs a recorder.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `daedalus_directive_invocations_total` | Counter | `directive`, `outcome` | Wrapper invocations |
//! | `daedalus_fetch_duration_seconds` | Histogram | `url` | Remote retrieval latency |
//! | `daedalus_schema_compilations_total` | Counter | `outcome` | Schema compilations |

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Outcome label of a directive invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The wrapper let the chain complete successfully.
    Success,
    /// The wrapper or something it wraps failed.
    Failure,
    /// The wrapper aborted the chain without calling inward.
    Rejected,
}

impl Outcome {
    /// Returns the label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Rejected => "rejected",
        }
    }
}

/// Registers descriptions for all Daedalus metrics.
pub fn describe_metrics() {
    describe_counter!(
        "daedalus_directive_invocations_total",
        "Directive wrapper invocations by outcome"
    );
    describe_histogram!(
        "daedalus_fetch_duration_seconds",
        "Remote retrieval duration in seconds"
    );
    describe_counter!(
        "daedalus_schema_compilations_total",
        "Schema compilations by outcome"
    );
}

/// Records one directive wrapper invocation.
pub fn record_directive(directive: &str, outcome: Outcome) {
    counter!(
        "daedalus_directive_invocations_total",
        "directive" => directive.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Records the duration of a remote retrieval.
pub fn record_fetch(url: &str, duration: Duration) {
    histogram!(
        "daedalus_fetch_duration_seconds",
        "url" => url.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a schema compilation.
pub fn record_compilation(succeeded: bool) {
    let outcome = if succeeded {
        Outcome::Success
    } else {
        Outcome::Failure
    };
    counter!(
        "daedalus_schema_compilations_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::Failure.as_str(), "failure");
        assert_eq!(Outcome::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_record_functions_dont_panic() {
        // No recorder installed: the facade discards everything.
        describe_metrics();
        record_directive("upper", Outcome::Success);
        record_fetch("https://example.com", Duration::from_millis(12));
        record_compilation(false);
    }
}
