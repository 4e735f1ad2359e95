//! Brazilian-formatted numbers: `.` groups thousands, `,` separates decimals.

use once_cell::sync::Lazy;
use regex::Regex;

static BRL_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)R\$\s*([0-9.,]+)").unwrap());

/// Parses the first `R$ <amount>` in `raw` into a major-unit value.
///
/// Every digit of the amount is kept and the result divided by 100, so
/// `"R$ 1.200,00"` is `1200.0` and `"R$ 90,00"` is `90.0`. Returns `None`
/// when there is no `R$` marker or no digits follow it.
pub fn parse_brl(raw: &str) -> Option<f64> {
    let caps = BRL_AMOUNT.captures(raw)?;
    let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let cents: f64 = digits.parse().ok()?;
    Some(cents / 100.0).filter(|v| v.is_finite())
}

/// Parses a localized number such as `"65 m²"`, `"1,5"` or `"Quartos: 2"`.
///
/// Whitespace is dropped, the first comma becomes a decimal point, anything
/// other than digits, `.` and `-` is removed, and the longest numeric prefix
/// of what remains is parsed.
pub fn parse_localized_number(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned: String = compact
        .replacen(',', ".", 1)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    leading_float(&cleaned)
}

fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
