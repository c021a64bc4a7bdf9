use serde::Serialize;
use serde_json::{Map, Value};

/// Above this magnitude a duration is assumed to be in nanoseconds rather than seconds.
/// The inference server gives no unit guarantee, so this stays a heuristic.
const NANOSECOND_THRESHOLD: f64 = 1_000_000.0;
const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Performance counters reported by a single generation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub eval_count: Option<u64>,
    pub eval_duration_secs: Option<f64>,
    pub total_duration_secs: Option<f64>,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        self.eval_count.is_none()
            && self.eval_duration_secs.is_none()
            && self.total_duration_secs.is_none()
    }

    /// Throughput in tokens per second, or `None` when there is no usable count or duration.
    ///
    /// The duration is taken from `eval_duration`, then `total_duration`, then `fallback_secs`,
    /// using the first one that is strictly positive.
    pub fn tokens_per_second(&self, fallback_secs: Option<f64>) -> Option<f64> {
        let count = self.eval_count? as f64;
        let duration = [self.eval_duration_secs, self.total_duration_secs, fallback_secs]
            .into_iter()
            .flatten()
            .find(|d| d.is_finite() && *d > 0.0)?;

        let rate = count / duration;
        if rate.is_finite() && rate > 0.0 {
            Some(rate)
        } else {
            None
        }
    }
}

/// Reads the counters out of a raw generation response.
pub fn record_metrics(raw: &Map<String, Value>) -> Metrics {
    if raw.is_empty() {
        return Metrics::default();
    }

    Metrics {
        eval_count: raw.get("eval_count").and_then(coerce_count),
        eval_duration_secs: raw.get("eval_duration").and_then(coerce_seconds),
        total_duration_secs: raw.get("total_duration").and_then(coerce_seconds),
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn coerce_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n).filter(|n| *n > 0);
    }
    coerce_number(value)
        .filter(|n| *n >= 1.0)
        .map(|n| n.trunc() as u64)
}

fn coerce_seconds(value: &Value) -> Option<f64> {
    let n = coerce_number(value).filter(|n| *n > 0.0)?;
    if n > NANOSECOND_THRESHOLD {
        Some(n / NANOS_PER_SECOND)
    } else {
        Some(n)
    }
}
