//! Human-readable duration grammar.
//!
//! A duration is a sequence of `magnitude unit` pairs such as `300ms`, `1.5s`
//! or `1h30m`, with units `ns`, `us` (`µs`, `μs`), `ms`, `s`, `m` and `h`.
//! A bare `0` is also accepted. [`format`] produces the same grammar, so
//! `parse(&format(d)) == Ok(d)` for every duration.

use std::time::Duration;
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Longest fractional part that is taken into account.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("negative durations are not supported")]
    Negative,

    #[error("invalid duration syntax")]
    Syntax,

    #[error("missing unit in duration")]
    MissingUnit,

    #[error("unknown unit {0:?} in duration")]
    UnknownUnit(String),

    #[error("duration out of range")]
    Overflow,
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn parse_digits(digits: &str) -> Result<u128, DurationError> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<u128>().map_err(|_| DurationError::Overflow)
}

/// Parse a duration such as `1h30m` or `250ms`.
pub fn parse(text: &str) -> Result<Duration, DurationError> {
    if text.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut rest = text;
    if let Some(unsigned) = rest.strip_prefix('-') {
        // -0 is still zero
        if unsigned == "0" {
            return Ok(Duration::ZERO);
        }
        return Err(DurationError::Negative);
    }
    if let Some(unsigned) = rest.strip_prefix('+') {
        rest = unsigned;
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationError::Syntax);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);
        rest = after_int;

        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_digits = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
            if int_digits.is_empty() && frac_digits.is_empty() {
                return Err(DurationError::Syntax);
            }
        } else if int_digits.is_empty() {
            return Err(DurationError::Syntax);
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after_unit) = rest.split_at(unit_len);
        rest = after_unit;
        if unit.is_empty() {
            return Err(DurationError::MissingUnit);
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit(unit.to_owned()))?;

        let mut nanos = parse_digits(int_digits)?
            .checked_mul(scale)
            .ok_or(DurationError::Overflow)?;
        if !frac_digits.is_empty() {
            let digits = &frac_digits[..frac_digits.len().min(MAX_FRACTION_DIGITS)];
            let numerator = parse_digits(digits)?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(numerator * scale / denominator)
                .ok_or(DurationError::Overflow)?;
        }
        total = total.checked_add(nanos).ok_or(DurationError::Overflow)?;
    }

    from_nanos(total)
}

fn from_nanos(nanos: u128) -> Result<Duration, DurationError> {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).map_err(|_| DurationError::Overflow)?;
    Ok(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

/// `value / scale` with the fractional part trimmed of trailing zeros.
fn fixed_point(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Render a duration in canonical form, e.g. `1h30m0s`, `1.5s`, `250ms`.
pub fn format(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", fixed_point(nanos, 1_000));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", fixed_point(nanos, 1_000_000));
    }

    let secs = nanos / NANOS_PER_SEC;
    let subsec = nanos % NANOS_PER_SEC;
    let hours = secs / 3_600;
    let minutes = secs / 60 % 60;
    let seconds = secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&fixed_point(seconds * NANOS_PER_SEC + subsec, NANOS_PER_SEC));
    out.push('s');
    out
}
