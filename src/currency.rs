use crate::schema::CellValue;

/// Converts a monetary cell to a number. Never fails: anything that cannot be
/// read as an amount is worth zero.
///
/// Accounting notation `(1,234.50)` forces a negative result.
pub fn clean_currency(raw: &CellValue) -> f64 {
    match raw {
        CellValue::Number(n) => *n,
        CellValue::Empty => 0.0,
        CellValue::Text(s) => clean_currency_str(s),
    }
}

pub fn clean_currency_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let parens_negative = trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')');

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return 0.0;
    }

    let Some(value) = parse_leading_decimal(&cleaned) else {
        return 0.0;
    };

    if parens_negative {
        -value.abs()
    } else {
        value
    }
}

/// Reads the longest `-?digits[.digits]` prefix, ignoring whatever follows
/// (so `1.2.3` reads as `1.2` and `12-3` as `12`).
fn parse_leading_decimal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if frac_digits > 0 || digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    s[..end].parse::<f64>().ok()
}
