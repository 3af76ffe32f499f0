use serde::Serialize;
use std::fmt;
use std::time::Duration;

const FIELD_WIDTH: usize = 24; // width of each label for formatting print
const NO_DATA: &str = "no data";

/// Counters for one attacker's run.
///
/// A `Report` is a plain value: handing one out never shares state with the
/// attacker's live counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Report {
    pub request_count: u64, // every request issued, failed or not
    pub error_count: u64, // transport failures and status >= 400
    pub response_time_ms_total: i64, // sum of whole-millisecond latencies
}

impl Report {
    /// Fold another report into this one
    pub fn absorb(&mut self, other: &Report) {
        self.request_count += other.request_count;
        self.error_count += other.error_count;
        self.response_time_ms_total += other.response_time_ms_total;
    }
}

/// Totals of one assault, derived from every attacker's [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_requests: u64,
    pub total_errors: u64,
    pub average_response_ms: f64, // 0.0 when no request was made
    pub availability_pct: f64, // 0.0 when no request was made
    pub requests_per_second: f64,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl Summary {
    /// Reduce attacker reports into one summary.
    ///
    /// Input order does not matter. Zero requests or a zero elapsed time
    /// yield zeroes, never NaN or infinity.
    pub fn reduce<'a, I>(reports: I, elapsed: Duration) -> Self
    where
        I: IntoIterator<Item = &'a Report>,
    {
        let mut combined = Report::default();
        for report in reports {
            combined.absorb(report);
        }

        let requests = combined.request_count as f64;
        let (average_response_ms, availability_pct) = if combined.request_count == 0 {
            (0.0, 0.0)
        } else {
            let successes = combined.request_count.saturating_sub(combined.error_count) as f64;
            (
                (combined.response_time_ms_total as f64) / requests,
                (successes * 100.0) / requests,
            )
        };

        let seconds = elapsed.as_secs_f64();
        let requests_per_second = if seconds > 0.0 { requests / seconds } else { 0.0 };

        Self {
            total_requests: combined.request_count,
            total_errors: combined.error_count,
            average_response_ms,
            availability_pct,
            requests_per_second,
            elapsed,
        }
    }

    /// Whether any request was made at all
    pub fn has_data(&self) -> bool {
        self.total_requests > 0
    }
}

fn serialize_secs<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer
{
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (average, availability) = if self.has_data() {
            (
                format!("{:.2}", self.average_response_ms),
                format!("{:.2}%", self.availability_pct),
            )
        } else {
            (NO_DATA.to_string(), NO_DATA.to_string())
        };

        writeln!(f, "{:<w$}{}", "Total Request Count:", self.total_requests, w = FIELD_WIDTH)?;
        writeln!(f, "{:<w$}{}", "Average Response Time:", average, w = FIELD_WIDTH)?;
        writeln!(f, "{:<w$}{}", "Error Count:", self.total_errors, w = FIELD_WIDTH)?;
        writeln!(f, "{:<w$}{}", "Availability:", availability, w = FIELD_WIDTH)?;
        write!(f, "{:<w$}{:.2}", "Requests Per Second:", self.requests_per_second, w = FIELD_WIDTH)
    }
}
