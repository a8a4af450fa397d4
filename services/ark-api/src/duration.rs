//! Kubernetes duration parsing.
//!
//! Accepts the same shapes the API server accepts for `metav1.Duration`
//! fields: "1000ms", "30s", "5m", "1h", "5m0s", "1h30m0s". Components must
//! appear in `h`, `m`, `s`, `ms` order and days are rejected.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // A bare `m` followed by `s` can never complete a match, so the anchored
    // pattern needs no lookahead to tell minutes from milliseconds.
    Regex::new(r"^(?:([0-9]+)h)?(?:([0-9]+)m)?(?:([0-9]+)s)?(?:([0-9]+)ms)?$")
        .unwrap_or_else(|e| unreachable!("duration pattern is valid: {e}"))
});

/// Duration parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    /// Input does not follow the Kubernetes duration grammar
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),
}

/// Parses a Kubernetes duration string into whole seconds.
///
/// Returns `Ok(None)` for absent or blank input. Sub-second remainders are
/// truncated.
pub fn parse_duration_to_seconds(input: Option<&str>) -> Result<Option<u64>, DurationError> {
    let Some(raw) = input else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = || DurationError::InvalidFormat(trimmed.to_string());
    let caps = DURATION_RE.captures(trimmed).ok_or_else(invalid)?;
    if caps.iter().skip(1).all(|group| group.is_none()) {
        return Err(invalid());
    }

    let component = |index: usize| -> Result<u64, DurationError> {
        caps.get(index)
            .map_or(Ok(0), |m| m.as_str().parse::<u64>().map_err(|_| invalid()))
    };
    let hours = component(1)?;
    let minutes = component(2)?;
    let seconds = component(3)?;
    let millis = component(4)?;

    hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
        .and_then(|total| total.checked_add(seconds))
        .and_then(|total| total.checked_add(millis / 1000))
        .map(Some)
        .ok_or_else(invalid)
}
