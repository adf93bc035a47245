// src/format.rs
// Parses the printf-style specifier (e.g. "%.3f") used to render elapsed seconds.

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

pub const DEFAULT_FORMAT_SPEC: &str = "%.3f";

/// The conversion character of a format spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Fixed { upper: bool },
    Exponent { upper: bool },
    General { upper: bool },
    Integer,
    /// `%s`, `%r`, `%a`: the shortest round-trip decimal, as Python's `repr`.
    Repr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Conversion {
    left_align: bool,
    plus_sign: bool,
    space_sign: bool,
    zero_pad: bool,
    alternate: bool,
    width: usize,
    precision: Option<usize>,
    kind: Kind,
}

/// A parsed elapsed-seconds format: literal text around exactly one
/// numeric conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElapsedFormat {
    spec: String,
    prefix: String,
    suffix: String,
    conversion: Conversion,
}

impl ElapsedFormat {
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut conversion = None;
        let mut chars = spec.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                if conversion.is_some() { suffix.push(c) } else { prefix.push(c) }
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                if conversion.is_some() { suffix.push('%') } else { prefix.push('%') }
                continue;
            }
            if conversion.is_some() {
                return Err(FormatError::TooManyConversions(spec.to_string()));
            }

            let mut conv = Conversion {
                left_align: false,
                plus_sign: false,
                space_sign: false,
                zero_pad: false,
                alternate: false,
                width: 0,
                precision: None,
                kind: Kind::Fixed { upper: false },
            };

            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => conv.left_align = true,
                    '+' => conv.plus_sign = true,
                    ' ' => conv.space_sign = true,
                    '0' => conv.zero_pad = true,
                    '#' => conv.alternate = true,
                    _ => break,
                }
                chars.next();
            }
            conv.width = take_number(&mut chars);
            if chars.peek() == Some(&'.') {
                chars.next();
                conv.precision = Some(take_number(&mut chars));
            }
            // Length modifiers carry no meaning for a float argument.
            while matches!(chars.peek(), Some('h' | 'l' | 'L')) {
                chars.next();
            }

            conv.kind = match chars.next() {
                None => return Err(FormatError::Incomplete(spec.to_string())),
                Some('f') => Kind::Fixed { upper: false },
                Some('F') => Kind::Fixed { upper: true },
                Some('e') => Kind::Exponent { upper: false },
                Some('E') => Kind::Exponent { upper: true },
                Some('g') => Kind::General { upper: false },
                Some('G') => Kind::General { upper: true },
                Some('d' | 'i' | 'u') => Kind::Integer,
                Some('s' | 'r' | 'a') => Kind::Repr,
                Some(found) => {
                    return Err(FormatError::UnsupportedConversion { spec: spec.to_string(), found })
                }
            };
            conversion = Some(conv);
        }

        let conversion = conversion.ok_or_else(|| FormatError::MissingConversion(spec.to_string()))?;
        Ok(ElapsedFormat { spec: spec.to_string(), prefix, suffix, conversion })
    }

    /// The spec string this format was parsed from.
    pub fn as_str(&self) -> &str {
        &self.spec
    }

    /// Renders `seconds` with the surrounding literal text.
    pub fn render(&self, seconds: f64) -> String {
        let conv = &self.conversion;
        if conv.kind == Kind::Repr {
            // Text conversion: sign and zero flags do not apply, precision truncates.
            let mut text = shortest_repr(seconds);
            if let Some(precision) = conv.precision {
                text = text.chars().take(precision).collect();
            }
            let width = conv.width;
            let field = if conv.left_align { format!("{text:<width$}") } else { format!("{text:>width$}") };
            return format!("{}{}{}", self.prefix, field, self.suffix);
        }

        let (negative, body) = if seconds.is_finite() {
            conv.body(seconds)
        } else {
            let upper = matches!(
                conv.kind,
                Kind::Fixed { upper: true } | Kind::Exponent { upper: true } | Kind::General { upper: true }
            );
            let text = if seconds.is_nan() { "nan" } else { "inf" };
            let text = if upper { text.to_uppercase() } else { text.to_string() };
            (seconds.is_sign_negative() && !seconds.is_nan(), text)
        };

        let sign = if negative {
            "-"
        } else if conv.plus_sign {
            "+"
        } else if conv.space_sign {
            " "
        } else {
            ""
        };

        let len = sign.len() + body.len();
        let field = if conv.width <= len {
            format!("{sign}{body}")
        } else {
            let pad = conv.width - len;
            if conv.left_align {
                format!("{sign}{body}{}", " ".repeat(pad))
            } else if conv.zero_pad && seconds.is_finite() {
                format!("{sign}{}{body}", "0".repeat(pad))
            } else {
                format!("{}{sign}{body}", " ".repeat(pad))
            }
        };

        format!("{}{}{}", self.prefix, field, self.suffix)
    }
}

impl Conversion {
    /// Unsigned digits of a finite value, plus whether a minus sign is owed.
    fn body(&self, value: f64) -> (bool, String) {
        let abs = value.abs();
        match self.kind {
            Kind::Fixed { .. } => {
                let precision = self.precision.unwrap_or(6);
                let mut body = format!("{abs:.precision$}");
                if self.alternate && precision == 0 {
                    body.push('.');
                }
                (value.is_sign_negative(), body)
            }
            Kind::Exponent { upper } => {
                let precision = self.precision.unwrap_or(6);
                (value.is_sign_negative(), exponent_form(abs, precision, upper, self.alternate))
            }
            Kind::General { upper } => (value.is_sign_negative(), self.general(abs, upper)),
            Kind::Integer => {
                let truncated = value.trunc();
                let digits = format!("{:.0}", truncated.abs());
                let digits = match self.precision {
                    Some(min_digits) => format!("{digits:0>min_digits$}"),
                    None => digits,
                };
                (truncated < 0.0, digits)
            }
            Kind::Repr => (false, shortest_repr(value)),
        }
    }

    fn general(&self, abs: f64, upper: bool) -> String {
        let precision = match self.precision.unwrap_or(6) {
            0 => 1,
            p => p,
        };
        let exponent = if abs == 0.0 { 0 } else { decimal_exponent(abs, precision - 1) };

        let mut body = if exponent >= -4 && exponent < precision as i32 {
            let decimals = (precision as i32 - 1 - exponent) as usize;
            format!("{abs:.decimals$}")
        } else {
            exponent_form(abs, precision - 1, upper, self.alternate)
        };

        if !self.alternate {
            body = strip_trailing_zeros(&body);
        } else if !body.contains('.') {
            match body.find(['e', 'E']) {
                Some(idx) => body.insert(idx, '.'),
                None => body.push('.'),
            }
        }
        body
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> usize {
    let mut n = 0usize;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = n.saturating_mul(10).saturating_add(digit as usize);
        chars.next();
    }
    n
}

/// Decimal exponent of `abs` after rounding to `precision + 1` significant digits.
fn decimal_exponent(abs: f64, precision: usize) -> i32 {
    let formatted = format!("{abs:.precision$e}");
    formatted
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

/// C-style scientific notation: explicit exponent sign, at least two exponent digits.
fn exponent_form(abs: f64, precision: usize, upper: bool, alternate: bool) -> String {
    let formatted = format!("{abs:.precision$e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let dot = if alternate && precision == 0 { "." } else { "" };
    let e = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{dot}{e}{sign}{:02}", exponent.abs())
}

/// Python-style `repr` of a float: shortest round-trip digits, always with a
/// `.0` or an exponent, switching to scientific outside `1e-4 <= |v| < 1e16`.
fn shortest_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let abs = value.abs();
    if abs.is_infinite() {
        return format!("{sign}inf");
    }

    let scientific = format!("{abs:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if abs == 0.0 || (-4..16).contains(&exponent) {
        let mut digits = format!("{abs}");
        if !digits.contains('.') {
            digits.push_str(".0");
        }
        format!("{sign}{digits}")
    } else {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs())
    }
}

fn strip_trailing_zeros(body: &str) -> String {
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => body.split_at(idx),
        None => (body, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}{exponent}")
}

impl Default for ElapsedFormat {
    fn default() -> Self {
        ElapsedFormat {
            spec: DEFAULT_FORMAT_SPEC.to_string(),
            prefix: String::new(),
            suffix: String::new(),
            conversion: Conversion {
                left_align: false,
                plus_sign: false,
                space_sign: false,
                zero_pad: false,
                alternate: false,
                width: 0,
                precision: Some(3),
                kind: Kind::Fixed { upper: false },
            },
        }
    }
}

impl FromStr for ElapsedFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElapsedFormat::parse(s)
    }
}

impl fmt::Display for ElapsedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(spec: &str, value: f64) -> String {
        ElapsedFormat::parse(spec).unwrap().render(value)
    }

    #[test]
    fn test_default_is_three_decimals() {
        assert_eq!(ElapsedFormat::default(), ElapsedFormat::parse("%.3f").unwrap());
        assert_eq!(ElapsedFormat::default().render(1.0016), "1.002");
        assert_eq!(ElapsedFormat::default().render(0.0), "0.000");
    }

    #[test]
    fn test_fixed_precision_and_padding() {
        assert_eq!(render("%f", 2.5), "2.500000");
        assert_eq!(render("%.1f", 12.34), "12.3");
        assert_eq!(render("%.0f", 3.7), "4");
        assert_eq!(render("%#.0f", 3.7), "4.");
        assert_eq!(render("%8.2f", 3.14159), "    3.14");
        assert_eq!(render("%-8.2f|", 3.14159), "3.14    |");
        assert_eq!(render("%08.2f", 3.14159), "00003.14");
        assert_eq!(render("%+.2f", 3.14159), "+3.14");
        assert_eq!(render("% .2f", 3.14159), " 3.14");
        assert_eq!(render("%08.2f", -3.14159), "-0003.14");
    }

    #[test]
    fn test_exponent_form() {
        assert_eq!(render("%.3e", 1.5), "1.500e+00");
        assert_eq!(render("%.2E", 0.000123), "1.23E-04");
        assert_eq!(render("%e", 12345.678), "1.234568e+04");
    }

    #[test]
    fn test_general_form() {
        assert_eq!(render("%g", 1.5), "1.5");
        assert_eq!(render("%g", 0.0001), "0.0001");
        assert_eq!(render("%g", 0.00001), "1e-05");
        assert_eq!(render("%.3g", 1234.5), "1.23e+03");
        assert_eq!(render("%.3g", 2.0), "2");
        assert_eq!(render("%#.3g", 2.0), "2.00");
        assert_eq!(render("%g", 0.0), "0");
        assert_eq!(render("%G", 0.00001), "1E-05");
    }

    #[test]
    fn test_integer_truncates() {
        assert_eq!(render("%d", 1.99), "1");
        assert_eq!(render("%i", -0.5), "0");
        assert_eq!(render("%3d", 7.2), "  7");
        assert_eq!(render("%.3d", 7.2), "007");
        assert_eq!(render("%5.3d", 42.9), "  042");
        assert_eq!(render("%.2d", 123.0), "123");
    }

    #[test]
    fn test_repr_conversion() {
        assert_eq!(render("%s", 1.5), "1.5");
        assert_eq!(render("%r", 1.0), "1.0");
        assert_eq!(render("%a", 0.0), "0.0");
        assert_eq!(render("%s", 0.0001), "0.0001");
        assert_eq!(render("%s", 0.00001), "1e-05");
        assert_eq!(render("%s", 1e16), "1e+16");
        assert_eq!(render("%s", 1e15), "1000000000000000.0");
        assert_eq!(render("%s", -2.5), "-2.5");
        assert_eq!(render("%s sec", 0.1), "0.1 sec");
    }

    #[test]
    fn test_repr_width_and_truncation() {
        assert_eq!(render("%5.1s", 1.5), "    1");
        assert_eq!(render("%-6s|", 2.25), "2.25  |");
        assert_eq!(render("%.4s", 1.23456), "1.23");
        // Sign and zero flags are ignored for text conversions.
        assert_eq!(render("%+s", 1.5), "1.5");
        assert_eq!(render("%05s", 1.5), "  1.5");
        assert_eq!(render("%s", f64::INFINITY), "inf");
    }

    #[test]
    fn test_literal_text_and_percent_escape() {
        assert_eq!(render("~%.2fs", 1.234), "~1.23s");
        assert_eq!(render("%.1f%%", 50.0), "50.0%");
        assert_eq!(ElapsedFormat::parse("%%%.2f").unwrap().to_string(), "%%%.2f");
    }

    #[test]
    fn test_rejects_bad_specs() {
        assert_eq!(
            ElapsedFormat::parse("seconds"),
            Err(FormatError::MissingConversion("seconds".to_string()))
        );
        assert_eq!(
            ElapsedFormat::parse("100%%"),
            Err(FormatError::MissingConversion("100%%".to_string()))
        );
        assert_eq!(
            ElapsedFormat::parse("%.3f %.3f"),
            Err(FormatError::TooManyConversions("%.3f %.3f".to_string()))
        );
        assert_eq!(ElapsedFormat::parse("%.3"), Err(FormatError::Incomplete("%.3".to_string())));
        assert_eq!(
            "%.3q".parse::<ElapsedFormat>(),
            Err(FormatError::UnsupportedConversion { spec: "%.3q".to_string(), found: 'q' })
        );
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(render("%.3f", f64::INFINITY), "inf");
        assert_eq!(render("%.3F", f64::NAN), "NAN");
        assert_eq!(render("%6.1f", f64::NEG_INFINITY), "  -inf");
    }
}
