//! Ready-made validators for [`Param::validate`](crate::Param::validate).
//!
//! Any closure `Fn(&T) -> Result<(), String>` works as a validator; these
//! cover the common cases with stable messages.

use crate::coerce::Kind;
use std::cmp::Ordering;

/// Accept values within `[lo, hi]`. Works for ints, floats and durations.
///
/// A value that does not compare with the bounds, such as a float `NaN`, is
/// rejected.
pub fn range<T>(lo: T, hi: T) -> impl Fn(&T) -> Result<(), String> + Send + Sync + 'static
where
    T: Kind + PartialOrd,
{
    move |v| {
        let above_lo = matches!(v.partial_cmp(&lo), Some(Ordering::Greater | Ordering::Equal));
        let below_hi = matches!(v.partial_cmp(&hi), Some(Ordering::Less | Ordering::Equal));
        if above_lo && below_hi {
            Ok(())
        } else {
            Err(format!(
                "value {} is not in range [{}, {}]",
                v.render(),
                lo.render(),
                hi.render()
            ))
        }
    }
}

/// Accept only the listed values.
pub fn one_of<T, I>(allowed: I) -> impl Fn(&T) -> Result<(), String> + Send + Sync + 'static
where
    T: Kind + PartialEq,
    I: IntoIterator,
    I::Item: Into<T>,
{
    one_of_values(allowed.into_iter().map(Into::into).collect())
}

fn one_of_values<T>(allowed: Vec<T>) -> impl Fn(&T) -> Result<(), String> + Send + Sync + 'static
where
    T: Kind + PartialEq,
{
    move |v| {
        if allowed.contains(v) {
            return Ok(());
        }
        let listed: Vec<String> = allowed.iter().map(Kind::render).collect();
        Err(format!(
            "value {} is not one of [{}]",
            v.render(),
            listed.join(" ")
        ))
    }
}

/// Accept strings of at least `n` characters.
pub fn min_len(n: usize) -> impl Fn(&String) -> Result<(), String> + Send + Sync + 'static {
    move |v| {
        let len = v.chars().count();
        if len < n {
            Err(format!("string length {len} is less than minimum {n}"))
        } else {
            Ok(())
        }
    }
}

/// Accept strings of at most `n` characters.
pub fn max_len(n: usize) -> impl Fn(&String) -> Result<(), String> + Send + Sync + 'static {
    move |v| {
        let len = v.chars().count();
        if len > n {
            Err(format!("string length {len} is greater than maximum {n}"))
        } else {
            Ok(())
        }
    }
}

pub fn not_empty() -> impl Fn(&String) -> Result<(), String> + Send + Sync + 'static {
    |v| {
        if v.is_empty() {
            Err("string must not be empty".to_owned())
        } else {
            Ok(())
        }
    }
}

/// Accept lists with at least `n` items.
pub fn min_items<T: 'static>(n: usize) -> impl Fn(&Vec<T>) -> Result<(), String> + Send + Sync + 'static {
    move |v| {
        if v.len() < n {
            Err(format!("list has {} items, minimum is {n}", v.len()))
        } else {
            Ok(())
        }
    }
}

/// Accept lists with at most `n` items.
pub fn max_items<T: 'static>(n: usize) -> impl Fn(&Vec<T>) -> Result<(), String> + Send + Sync + 'static {
    move |v| {
        if v.len() > n {
            Err(format!("list has {} items, maximum is {n}", v.len()))
        } else {
            Ok(())
        }
    }
}

pub fn positive() -> impl Fn(&i64) -> Result<(), String> + Send + Sync + 'static {
    |v| {
        if *v <= 0 {
            Err(format!("value {v} must be positive"))
        } else {
            Ok(())
        }
    }
}

pub fn non_negative() -> impl Fn(&i64) -> Result<(), String> + Send + Sync + 'static {
    |v| {
        if *v < 0 {
            Err(format!("value {v} must be non-negative"))
        } else {
            Ok(())
        }
    }
}
