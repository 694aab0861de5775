//! Zero-value classification.

use crate::domain::ast::{Expr, LitKind};

/// Reports whether `x` is written as a zero value.
///
/// Literals are judged by their text: integers in any base, decimal and
/// hexadecimal floats, imaginary numbers, the empty string, and any composite
/// literal without elements. `nil` is the only identifier accepted.
pub fn is_zero(x: &Expr) -> bool {
    match x {
        Expr::Ident(id) => id.name == "nil",
        Expr::BasicLit(lit) => {
            let v = lit.value.as_str();
            if v.is_empty() {
                return false;
            }
            match lit.kind {
                LitKind::Int => parse_int(v) == Some(0),
                LitKind::Float => parse_float(v) == Some(0.0),
                LitKind::Imag => v
                    .strip_suffix('i')
                    .and_then(parse_float)
                    .is_some_and(|f| f == 0.0),
                // Only the bare digit; quoted rune spellings are not recognized.
                LitKind::Char => v == "0",
                LitKind::String => v == "\"\"" || v == "``",
            }
        }
        Expr::CompositeLit(lit) => lit.elts.is_empty(),
        _ => false,
    }
}

/// Parses a Go integer literal, honoring base prefixes and `_` separators.
fn parse_int(text: &str) -> Option<i64> {
    let (digits, radix) = match text.get(..2) {
        Some("0x") | Some("0X") => (&text[2..], 16),
        Some("0o") | Some("0O") => (&text[2..], 8),
        Some("0b") | Some("0B") => (&text[2..], 2),
        _ if text.len() > 1 && text.starts_with('0') => (&text[1..], 8),
        _ => (text, 10),
    };
    if digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    let digits = digits.strip_prefix('_').unwrap_or(digits);
    if digits.is_empty() {
        return None;
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    i64::from_str_radix(&cleaned, radix).ok()
}

/// Parses a Go floating-point literal, decimal or hexadecimal.
fn parse_float(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        return parse_hex_float(hex);
    }
    if !cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Hexadecimal floats need a `p` exponent. Only zero-ness matters to the
/// caller, so a valid literal with a non-zero mantissa yields `1.0`.
fn parse_hex_float(text: &str) -> Option<f64> {
    let (mantissa, exponent) = text.split_once(['p', 'P'])?;
    let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    if exponent.is_empty() || !exponent.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let mut zero = true;
    for c in int_part.chars().chain(frac_part.chars()) {
        if !c.is_ascii_hexdigit() {
            return None;
        }
        zero &= c == '0';
    }
    Some(if zero { 0.0 } else { 1.0 })
}
