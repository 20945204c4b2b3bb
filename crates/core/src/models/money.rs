/// Digits allowed before the decimal point for a `NUMERIC(10, 2)` column.
const MAX_WHOLE_DIGITS: usize = 8;
const MAX_FRACTION_DIGITS: usize = 2;

/// Checks a decimal amount such as `"45.00"` before it reaches a `NUMERIC(10, 2)` column.
///
/// Accepts non-negative plain decimals with at most two fractional digits.
pub fn validate_amount(field: &str, value: &str) -> Result<(), String> {
    let invalid = || {
        format!(
            "{} must be a non-negative amount with at most {} decimal places",
            field, MAX_FRACTION_DIGITS
        )
    };

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty()
            || fraction.len() > MAX_FRACTION_DIGITS
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
    }

    let significant = whole.trim_start_matches('0');
    if significant.len() > MAX_WHOLE_DIGITS {
        return Err(format!("{} is too large", field));
    }

    Ok(())
}
