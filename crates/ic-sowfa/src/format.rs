//! Numeric text for OpenFOAM-style bracketed tables.
//!
//! Two number policies, both matching C `printf`:
//! - [`g`]: `%g`, used for the leading time/height column
//! - [`g12`]: `%.12g`, used for every value column

use ic_core::Real;

/// Row indent inside a bracketed list.
pub const INDENT: &str = "    ";

/// C `%.{precision}g`.
///
/// Picks fixed or exponent notation from the decimal exponent after rounding
/// to `precision` significant digits, then strips trailing zeros.
pub fn format_g(value: Real, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let p = precision.max(1);
    let sci = format!("{:.*e}", p - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= p as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (p as i32 - 1 - exp) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// `%g`
pub fn g(value: Real) -> String {
    format_g(value, 6)
}

/// `%.12g`
pub fn g12(value: Real) -> String {
    format_g(value, 12)
}

/// `    (first v1 v2 ...)`
pub fn row(first: Real, values: &[Real]) -> String {
    let mut line = format!("{INDENT}({}", g(first));
    for v in values {
        line.push(' ');
        line.push_str(&g12(*v));
    }
    line.push(')');
    line
}

/// `    z`, one entry of a bare coordinate list.
pub fn coordinate(value: Real) -> String {
    format!("{INDENT}{}", g(value))
}

/// Named bracketed list:
///
/// ```text
/// name
/// (
///     ...lines...
/// );
///
/// ```
pub fn block<I>(name: &str, lines: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = format!("{name}\n(\n");
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(");\n\n");
    out
}

/// Lines joined with a trailing newline each.
pub fn lines<I>(lines: I) -> String
where
    I: IntoIterator<Item = String>,
{
    lines.into_iter().fold(String::new(), |mut out, line| {
        out.push_str(&line);
        out.push('\n');
        out
    })
}
