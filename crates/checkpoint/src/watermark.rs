//! End-of-window watermark.

use chrono::{DateTime, Utc};

use crate::Checkpoint;

/// The upper bound of the last completed run's window.
///
/// Rendered as seconds since the Unix epoch with a millisecond fraction,
/// e.g. `1612137600.000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    pub end: DateTime<Utc>,
}

impl Watermark {
    pub fn new(end: DateTime<Utc>) -> Self {
        Self { end }
    }
}

impl Checkpoint for Watermark {
    const CHECKPOINT_TYPE: &'static str = "watermark";

    fn to_cli_string(&self) -> String {
        let millis = self.end.timestamp_millis();
        let sign = if millis < 0 { "-" } else { "" };
        let abs = millis.unsigned_abs();
        format!("{sign}{}.{:03}", abs / 1000, abs % 1000)
    }

    fn from_cli_string(s: &str) -> anyhow::Result<Self> {
        let millis = parse_decimal_seconds(s.trim())
            .ok_or_else(|| anyhow::anyhow!("Invalid watermark '{s}': expected decimal seconds"))?;
        let end = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| anyhow::anyhow!("Watermark '{s}' is out of range"))?;
        Ok(Self { end })
    }
}

/// Parses `[-]SECONDS[.FRACTION]` into milliseconds. Digits past the third
/// fractional place are dropped.
fn parse_decimal_seconds(s: &str) -> Option<i64> {
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let seconds: i64 = whole.parse().ok()?;
    let millis: i64 = format!("{:0<3}", &fraction[..fraction.len().min(3)])
        .parse()
        .ok()?;
    let total = seconds.checked_mul(1000)?.checked_add(millis)?;
    Some(if negative { -total } else { total })
}
