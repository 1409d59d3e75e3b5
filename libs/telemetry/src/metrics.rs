use ::metrics::{counter, histogram};
use tracing::Span;

const REQUESTS_COUNTER: &str = "relay_requests_total";
const FORWARD_HISTOGRAM: &str = "relay_forward_duration_seconds";

/// Final disposition of one relay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Forwarded,
    TestProbe,
    Forbidden,
    Misconfigured,
    Malformed,
    ForwardFailed,
}

impl RequestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOutcome::Forwarded => "forwarded",
            RequestOutcome::TestProbe => "test_probe",
            RequestOutcome::Forbidden => "forbidden",
            RequestOutcome::Misconfigured => "misconfigured",
            RequestOutcome::Malformed => "malformed",
            RequestOutcome::ForwardFailed => "forward_failed",
        }
    }
}

pub fn record_outcome(outcome: RequestOutcome) {
    counter!(REQUESTS_COUNTER, "outcome" => outcome.as_str()).increment(1);
}

pub fn record_forward_duration(seconds: f64, card_format: &'static str) {
    histogram!(FORWARD_HISTOGRAM, "format" => card_format).record(seconds);
}

/// Records the outcome on `span` as well as in the counter.
pub fn finish_span(span: &Span, outcome: RequestOutcome) {
    span.record("outcome", outcome.as_str());
    record_outcome(outcome);
}
