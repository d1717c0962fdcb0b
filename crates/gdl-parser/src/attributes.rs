use gdl_core::{AttrValue, Attributes};

/// Parse the inner text of an attribute list: `key=value` pairs separated by
/// commas.
///
/// Values are not quote-aware, so a value can never contain a comma or a
/// closing parenthesis. Segments without `=`, or with an empty key or value,
/// are skipped. A repeated key keeps its first position and its last value.
pub fn parse_attributes(raw: &str) -> Attributes {
    let mut attributes = Attributes::new();
    for segment in raw.split(',') {
        let Some((key, value)) = segment.split_once('=') else {
            if !segment.trim().is_empty() {
                tracing::trace!(segment, "skipping attribute segment without '='");
            }
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        attributes.insert(key.to_string(), coerce_value(value));
    }
    attributes
}

/// Booleans first, then numbers whose canonical rendering is exactly the
/// source text, otherwise the text itself.
pub fn coerce_value(raw: &str) -> AttrValue {
    match raw {
        "true" => AttrValue::Bool(true),
        "false" => AttrValue::Bool(false),
        _ => parse_canonical_number(raw)
            .map_or_else(|| AttrValue::Text(raw.to_string()), AttrValue::Number),
    }
}

// `03`, `1e3`, `+1`, `1.50`, `-0` and `0.0000001` all print differently from
// how they were written, so they stay strings. Non-finite values are never
// numbers: `Infinity` has no JSON encoding.
fn parse_canonical_number(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    (number_to_string(value) == raw).then_some(value)
}

/// Renders `value` the way ECMAScript `Number.prototype.toString` does:
/// shortest round-trip digits, plain notation for exponents in `[-7, 21)`,
/// `1e+21`/`1.5e-7` style otherwise.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn number_to_string(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_sign_negative() {
        return format!("-{}", number_to_string(-value));
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. `1.2345e-7`.
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    let k = digits.len() as i32;
    let n = exponent + 1;

    if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{int_part}.{frac_part}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let magnitude = (n - 1).unsigned_abs();
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{magnitude}")
        } else {
            format!("{first}.{rest}e{sign}{magnitude}")
        }
    }
}
