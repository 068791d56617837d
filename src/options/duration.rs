//! Duration flag values.
//!
//! Durations are written as a sequence of decimal numbers, each with an
//! optional fraction and a unit suffix, such as `300ms`, `2.5s` or `1h30m`.
//! Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
//! is also accepted.

use std::time::Duration;

const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 60 * 60 * 1_000_000_000),
];

/// Parse a duration string into a [`Duration`].
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration: {:?}", s);

    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() || s.starts_with('-') {
        return Err(invalid());
    }
    let s_body = s.strip_prefix('+').unwrap_or(s);

    let mut rest = s_body;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration: {:?}", s))?;
        if number_len == 0 {
            return Err(invalid());
        }
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| format!("unknown unit {:?} in duration: {:?}", unit, s))?;

        total = total
            .checked_add(scale_number(number, scale).ok_or_else(invalid)?)
            .ok_or_else(invalid)?;
        rest = tail;
    }

    let secs = u64::try_from(total / 1_000_000_000).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// Convert `whole.fraction` in the given unit to nanoseconds.
fn scale_number(number: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut nanos = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().ok()?.checked_mul(scale)?
    };

    let mut place = scale;
    for digit in fraction.chars() {
        let digit = digit.to_digit(10)? as u128;
        place /= 10;
        if place == 0 {
            break;
        }
        nanos += digit * place;
    }
    Some(nanos)
}

/// Format a duration the way it is accepted by [`parse_duration`].
///
/// Sub-second values use the largest fitting unit (`1.5ms`); longer values
/// are split into hours, minutes and seconds (`1h2m3.5s`).
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", with_fraction(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", with_fraction(nanos, 1_000_000));
    }

    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = u128::from(secs % 60) * 1_000_000_000 + u128::from(d.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", with_fraction(seconds, 1_000_000_000)));
    out
}

fn with_fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let rest = value % unit;
    if rest == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let fraction = format!("{:0width$}", rest, width = width);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
