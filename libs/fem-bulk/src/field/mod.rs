//! # Short Fields
//!
//! Every column of a short-format card is [`FIELD_WIDTH`] characters wide.
//! Identifiers and keywords are left-justified; reals are packed by
//! [`encode_real`] to keep as many significant digits as the width allows.
//!
//! ## Real encoding
//!
//! | Input | Form | Example |
//! |-------|------|---------|
//! | zero | literal | `" 0.0    "` |
//! | power of ten to 7 significant digits | `1.` and signed exponent | `1.0 → "1.+0    "` |
//! | `order ≥ 7` (positive), `order ≥ 6` (negative), `order < -2` | mantissa and signed exponent, no `E` | `12345678.0 → "1.2346+7"` |
//! | otherwise | fixed point, leading `0` dropped | `-0.0042 → "-.004200"` |
//!
//! where `order = ceil(log10(|x|))`. The exponent always carries its sign;
//! without it `1.2346+7` and `1.23467` would be indistinguishable to a reader.

use crate::error::{BulkError, BulkResult};
use config::constants::{
    FIELD_WIDTH, FIXED_POINT_DECIMALS, NEGATIVE_EXPONENT_ORDER, POSITIVE_EXPONENT_ORDER,
    ROUNDING_LIMIT, SMALL_EXPONENT_ORDER,
};

/// Encoded form of zero.
pub const ZERO_FIELD: &str = " 0.0    ";

/// An empty field.
pub fn blank() -> String {
    " ".repeat(FIELD_WIDTH)
}

/// Left-justifies `text` in one field.
pub fn text_field(text: &str) -> BulkResult<String> {
    if text.len() > FIELD_WIDTH {
        return Err(BulkError::FieldOverflow {
            text: text.to_string(),
            width: FIELD_WIDTH,
        });
    }
    Ok(format!("{:<width$}", text, width = FIELD_WIDTH))
}

/// Left-justifies an integer identifier in one field.
pub fn id_field(id: impl Into<u32>) -> BulkResult<String> {
    text_field(&id.into().to_string())
}

/// Rounds to [`FIXED_POINT_DECIMALS`] decimals while the scaled value stays
/// exactly representable.
fn round_fixed(x: f64) -> f64 {
    if x.abs() >= ROUNDING_LIMIT {
        return x;
    }
    let scale = 10f64.powi(FIXED_POINT_DECIMALS as i32);
    (x * scale).round() / scale
}

/// Decimal exponent of `x` when it is `±1eN` to [`FIXED_POINT_DECIMALS`]
/// significant digits.
fn power_of_ten(x: f64) -> Option<i32> {
    let rendered = format!("{:.*e}", FIXED_POINT_DECIMALS - 1, x.abs());
    let (mantissa, exponent) = rendered.split_once('e')?;
    if mantissa.trim_end_matches('0').trim_end_matches('.') != "1" {
        return None;
    }
    exponent.parse().ok()
}

/// Mantissa with as many fraction digits as fit beside the signed exponent.
fn exponential_form(x: f64) -> Option<String> {
    (0..FIELD_WIDTH).rev().find_map(|digits| {
        let rendered = format!("{:.*e}", digits, x);
        let (mantissa, exponent) = rendered.split_once('e')?;
        let exponent: i32 = exponent.parse().ok()?;
        let point = if mantissa.contains('.') { "" } else { "." };
        let field = format!("{mantissa}{point}{exponent:+}");
        (field.len() <= FIELD_WIDTH).then_some(field)
    })
}

/// Fixed-point rendering with the leading zero of `|x| < 1` removed.
fn fixed_form(x: f64) -> Option<String> {
    (0..=FIXED_POINT_DECIMALS).rev().find_map(|decimals| {
        let rendered = format!("{:.*}", decimals, x);
        let mut field = if let Some(rest) = rendered.strip_prefix("-0.") {
            format!("-.{rest}")
        } else if let Some(rest) = rendered.strip_prefix("0.") {
            format!(".{rest}")
        } else {
            rendered
        };
        if decimals == 0 {
            field.push('.');
        }
        (field.len() <= FIELD_WIDTH).then_some(field)
    })
}

/// Encodes `x` into exactly one field.
///
/// # Example
///
/// ```rust
/// use fem_bulk::field::encode_real;
///
/// assert_eq!(encode_real(0.0).unwrap(), " 0.0    ");
/// assert_eq!(encode_real(100.0).unwrap(), "1.+2    ");
/// assert_eq!(encode_real(12345678.0).unwrap(), "1.2346+7");
/// assert_eq!(encode_real(3.25).unwrap(), "3.250000");
/// ```
pub fn encode_real(x: f64) -> BulkResult<String> {
    if !x.is_finite() {
        return Err(BulkError::NonFiniteValue { value: x });
    }
    if x == 0.0 {
        return Ok(ZERO_FIELD.to_string());
    }

    let sign = if x < 0.0 { "-" } else { "" };

    let field = if let Some(exponent) = power_of_ten(x) {
        Some(format!("{sign}1.{exponent:+}"))
    } else {
        let order = x.abs().log10().ceil() as i32;
        let exponential = order < SMALL_EXPONENT_ORDER
            || (x > 0.0 && order >= POSITIVE_EXPONENT_ORDER)
            || (x < 0.0 && order >= NEGATIVE_EXPONENT_ORDER);
        if exponential {
            exponential_form(x)
        } else {
            fixed_form(round_fixed(x))
        }
    };

    let field = field.unwrap_or_default();
    if field.is_empty() || field.len() > FIELD_WIDTH {
        return Err(BulkError::EncodingLength { value: x, field });
    }
    Ok(format!("{:<width$}", field, width = FIELD_WIDTH))
}

/// Parses a short-format real.
///
/// Accepts the encoder's forms (`1.2346+7`, `-.004200`, `1.+0`) and the
/// explicit exponent forms `1.5E+3`, `1.5e3` and `1.5D3`. A decimal point is
/// required.
pub fn parse_real(field: &str) -> Option<f64> {
    let text = field.trim();
    if !text.contains('.') {
        return None;
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'E' | 'e' | 'D' | 'd');
    if !text.chars().all(allowed) {
        return None;
    }
    let text = text.replace(['D', 'd'], "E");

    // A sign after the first character starts an exponent.
    let value = match text[1..].find(['+', '-']).map(|i| i + 1) {
        Some(at) if !text[..at].ends_with(['E', 'e']) => {
            let (mantissa, exponent) = text.split_at(at);
            format!("{mantissa}E{exponent}").parse::<f64>()
        }
        _ => text.parse::<f64>(),
    };
    value.ok().filter(|v| v.is_finite())
}

/// Returns true when `field` fits one field and parses as a real.
pub fn is_valid_real(field: &str) -> bool {
    field.trim().len() <= FIELD_WIDTH && parse_real(field).is_some()
}

#[cfg(test)]
mod tests;
