// src/config/value.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A loosely typed option value.
///
/// Flags such as `fail-when-no-tests-run` or `debugMocha` may be given as a
/// boolean, a number, or a string depending on where they come from (TOML
/// file, CLI, programmatic callers). Interpretation is deferred to
/// [`OptionValue::is_truthy`] and [`OptionValue::parse_int`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl OptionValue {
    /// Loose truthiness.
    ///
    /// Falsy: `false`, `0`, `""` and the strings `"false"`, `"0"`, `"null"`,
    /// `"undefined"` (case-insensitive, surrounding whitespace ignored).
    /// Everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(n) => *n != 0,
            OptionValue::Text(s) => !matches!(
                s.trim().to_lowercase().as_str(),
                "" | "false" | "0" | "null" | "undefined"
            ),
        }
    }

    /// Whether a flag is switched on at all.
    ///
    /// Narrower than [`OptionValue::is_truthy`]: only `false`, `0` and the
    /// empty string switch a flag off. Strings such as `"0"` or `"false"`
    /// count as set.
    pub fn is_enabled(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(n) => *n != 0,
            OptionValue::Text(s) => !s.is_empty(),
        }
    }

    /// Integer interpretation using leading-digit semantics.
    ///
    /// Leading whitespace and an optional sign are accepted, parsing stops at
    /// the first non-digit (`"5abc"` -> 5). Booleans and strings without
    /// leading digits yield `None`.
    pub fn parse_int(&self) -> Option<i64> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Int(n) => Some(*n),
            OptionValue::Text(s) => parse_leading_int(s),
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    // Saturate rather than fail on absurdly long digit runs.
    let magnitude = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl FromStr for OptionValue {
    type Err = String;

    /// CLI parsing: `true`/`false` become booleans, plain integers become
    /// numbers, anything else is kept as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "true" => return Ok(OptionValue::Bool(true)),
            "false" => return Ok(OptionValue::Bool(false)),
            _ => {}
        }
        match trimmed.parse::<i64>() {
            Ok(n) => Ok(OptionValue::Int(n)),
            Err(_) => Ok(OptionValue::Text(s.to_string())),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(OptionValue::Bool(true).is_truthy());
        assert!(!OptionValue::Bool(false).is_truthy());
        assert!(OptionValue::Int(5).is_truthy());
        assert!(!OptionValue::Int(0).is_truthy());
        assert!(OptionValue::from("yes").is_truthy());
        assert!(OptionValue::from("true").is_truthy());
        for falsy in ["", "false", "FALSE", " 0 ", "null", "undefined"] {
            assert!(!OptionValue::from(falsy).is_truthy(), "{falsy:?}");
        }
    }

    #[test]
    fn enabled_only_off_for_false_zero_and_empty() {
        assert!(!OptionValue::Bool(false).is_enabled());
        assert!(!OptionValue::Int(0).is_enabled());
        assert!(!OptionValue::from("").is_enabled());
        for set in ["0", "false", "null", " "] {
            assert!(OptionValue::from(set).is_enabled(), "{set:?}");
        }
    }

    #[test]
    fn parse_int_uses_leading_digits() {
        assert_eq!(OptionValue::from("5").parse_int(), Some(5));
        assert_eq!(OptionValue::from("  9229abc").parse_int(), Some(9229));
        assert_eq!(OptionValue::from("-3").parse_int(), Some(-3));
        assert_eq!(OptionValue::from("abc").parse_int(), None);
        assert_eq!(OptionValue::from("").parse_int(), None);
        assert_eq!(OptionValue::Bool(true).parse_int(), None);
        assert_eq!(OptionValue::Int(7).parse_int(), Some(7));
    }

    #[test]
    fn from_str_classifies_cli_input() {
        assert_eq!("true".parse::<OptionValue>(), Ok(OptionValue::Bool(true)));
        assert_eq!("False".parse::<OptionValue>(), Ok(OptionValue::Bool(false)));
        assert_eq!("5858".parse::<OptionValue>(), Ok(OptionValue::Int(5858)));
        assert_eq!(
            "5858x".parse::<OptionValue>(),
            Ok(OptionValue::Text("5858x".to_string()))
        );
    }

    #[test]
    fn deserializes_untagged_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            a: OptionValue,
            b: OptionValue,
            c: OptionValue,
        }
        let h: Holder = toml::from_str("a = true\nb = 9229\nc = \"1\"\n").unwrap();
        assert_eq!(h.a, OptionValue::Bool(true));
        assert_eq!(h.b, OptionValue::Int(9229));
        assert_eq!(h.c, OptionValue::Text("1".to_string()));
    }
}
