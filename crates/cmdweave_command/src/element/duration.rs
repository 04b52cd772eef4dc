//! Duration parsing.
//!
//! Accepts ISO-8601 durations (`P1DT2H`, `PT30M`) as well as shorthand that
//! leaves out the `P` and `T` markers (`30m`, `2h15m`, `1d12h`, `3d`).

use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

static ISO_DURATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([-+]?)P(?:([-+]?[0-9]+)D)?(T(?:([-+]?[0-9]+)H)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)(?:[.,]([0-9]{0,9}))?S)?)?$",
    )
    .ok()
});

/// Rewrites shorthand into ISO-8601 form.
fn normalize(input: &str) -> String {
    let upper = input.to_uppercase();
    let (sign, mut s) = match upper.strip_prefix(['-', '+']) {
        Some(rest) => (&upper[..1], rest.to_string()),
        None => ("", upper.clone()),
    };
    if !s.contains('T') {
        if s.contains('D') {
            if s.contains(['H', 'M', 'S']) {
                s = s.replace('D', "DT");
            }
        } else if let Some(rest) = s.strip_prefix('P') {
            s = format!("PT{rest}");
        } else {
            s = format!("T{s}");
        }
    }
    if !s.starts_with('P') {
        s = format!("P{s}");
    }
    format!("{sign}{s}")
}

/// Parses a duration, accepting shorthand. Returns `None` if malformed or
/// out of range.
#[must_use]
pub fn parse_duration(input: &str) -> Option<TimeDelta> {
    parse_iso(&normalize(input))
}

fn parse_iso(text: &str) -> Option<TimeDelta> {
    let caps = ISO_DURATION.as_ref()?.captures(text)?;
    let group = |i: usize| caps.get(i).map(|m| m.as_str());
    let (days, hours, minutes, seconds) = (group(2), group(4), group(5), group(6));
    if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }
    if group(3).is_some() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }

    let number = |text: Option<&str>, per: i128| -> Option<i128> {
        text.map_or(Some(0), |t| t.parse::<i128>().ok())?
            .checked_mul(per)
    };
    let mut total = number(days, 86_400 * NANOS_PER_SECOND)?
        .checked_add(number(hours, 3_600 * NANOS_PER_SECOND)?)?
        .checked_add(number(minutes, 60 * NANOS_PER_SECOND)?)?
        .checked_add(number(seconds, NANOS_PER_SECOND)?)?;

    if let Some(fraction) = group(7).filter(|f| !f.is_empty()) {
        let nanos: i128 = format!("{fraction:0<9}").parse().ok()?;
        if seconds.is_some_and(|s| s.starts_with('-')) {
            total = total.checked_sub(nanos)?;
        } else {
            total = total.checked_add(nanos)?;
        }
    }
    if group(1) == Some("-") {
        total = total.checked_neg()?;
    }

    let secs = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).ok()?;
    let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SECOND)).ok()?;
    TimeDelta::new(secs, nanos)
}
