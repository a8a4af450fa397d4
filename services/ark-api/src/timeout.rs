//! Lenient timeout parsing for configuration values.
//!
//! Unlike [`crate::duration`], anything unparseable is treated as "not set"
//! so a bad value falls back to the default instead of failing.

use regex::Regex;
use std::sync::LazyLock;

static TIMEOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)(s|m|h)?$")
        .unwrap_or_else(|e| unreachable!("timeout pattern is valid: {e}"))
});

/// Parses `<int>`, `<int>s`, `<int>m` or `<int>h` into seconds.
pub fn parse_timeout_to_seconds(input: Option<&str>) -> Option<u64> {
    let caps = TIMEOUT_RE.captures(input?.trim())?;
    let value: u64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        None | Some("s") => 1,
        Some("m") => 60,
        Some("h") => 3600,
        Some(_) => return None,
    };
    value.checked_mul(multiplier)
}
