//! Parsing of the short stat labels shown on the site ("78%", "3x", "24/7", "5-7").
//!
//! A label either carries a number that can be counted up to, with some
//! decoration around it, or it is plain text that must be shown as written.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_STAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^0-9]*)([0-9]+(?:\.[0-9]+)?)([^0-9]*)$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    /// A value to animate towards, with the text drawn around it.
    Numeric {
        value: f64,
        prefix: String,
        suffix: String,
        /// Fraction digits as written in the label ("4.5x" has one).
        decimals: usize,
    },
    /// Text that is not a countable number and renders verbatim.
    Literal { text: String },
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Numeric {
                value,
                prefix,
                suffix,
                decimals,
            } => write!(f, "{}{:.*}{}", prefix, *decimals, value, suffix),
            Stat::Literal { text } => f.write_str(text),
        }
    }
}

/// Classify a stat label. Rules apply in order and the first match wins:
///
/// 1. a dash without a slash is a range, animated towards its upper bound
/// 2. anything with a slash ("24/7") is literal
/// 3. `<non-digits><number><non-digits>` is numeric
/// 4. everything else is literal
///
/// A dash only makes a range when no slash is present, so "5-7/3" is literal.
/// That follows the rule conditions and departs from the stated expectation
/// that a dash-and-slash label would classify as a range.
pub fn parse_stat(input: &str) -> Stat {
    if input.contains('-') && !input.contains('/') {
        return parse_range(input);
    }

    if input.contains('/') {
        return literal(input);
    }

    match NUMERIC_STAT.captures(input) {
        Some(caps) => {
            let number = &caps[2];
            match number.parse::<f64>() {
                Ok(value) => Stat::Numeric {
                    value,
                    prefix: caps[1].to_string(),
                    suffix: caps[3].to_string(),
                    decimals: fraction_digits(number),
                },
                Err(_) => literal(input),
            }
        }
        None => literal(input),
    }
}

fn parse_range(input: &str) -> Stat {
    let (low, high) = match input.split_once('-') {
        Some(parts) => parts,
        None => return literal(input),
    };

    match leading_number(high) {
        Some(number) => match number.parse::<f64>() {
            Ok(value) => Stat::Numeric {
                value,
                prefix: low.chars().filter(|c| !c.is_ascii_digit()).collect(),
                suffix: String::new(),
                decimals: fraction_digits(number),
            },
            Err(_) => literal(input),
        },
        // "abc-def": nothing to count towards
        None => literal(input),
    }
}

fn literal(input: &str) -> Stat {
    Stat::Literal {
        text: input.to_string(),
    }
}

/// Longest numeric prefix after leading whitespace: optional sign, digits,
/// optional fraction, optional exponent. `"7 days"` yields `"7"`, `".5"`
/// yields `".5"`, `"2e3"` yields `"2e3"`.
fn leading_number(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
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
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = if frac_end > frac_start { frac_end } else { end };
        }
    }

    if digits == 0 {
        return None;
    }

    // exponent only counts with at least one digit: "2e" is just 2
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&text[..end])
}

/// Fraction digits needed to show `number` as written, after any exponent.
fn fraction_digits(number: &str) -> usize {
    let (mantissa, exponent) = match number.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&number[..at], number[at + 1..].parse::<i64>().unwrap_or(0)),
        None => (number, 0),
    };
    let written = mantissa.split_once('.').map_or(0, |(_, frac)| frac.len()) as i64;
    (written - exponent).max(0) as usize
}
