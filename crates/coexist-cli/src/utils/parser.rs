use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    MissingSeparator(String),

    #[error("Empty key in --set value '{0}'.")]
    EmptyKey(String),

    #[error("Invalid {expected} value for {key}: '{value}'")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Splits a `KEY=VALUE` override at its first `=`.
pub fn parse_key_value(pair: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| ParseError::MissingSeparator(pair.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(pair.to_string()));
    }
    Ok((key, value.trim()))
}

pub fn parse_value<T: FromStr>(
    key: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}

/// A comma-separated list; blank entries are dropped.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_at_first_equals() {
        assert_eq!(
            parse_key_value("keys.temperature=T=K").unwrap(),
            ("keys.temperature", "T=K")
        );
        assert_eq!(
            parse_key_value(" critical.beta = 0.3 ").unwrap(),
            ("critical.beta", "0.3")
        );
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert_eq!(
            parse_key_value("critical.beta"),
            Err(ParseError::MissingSeparator("critical.beta".into()))
        );
        assert_eq!(
            parse_key_value("=1"),
            Err(ParseError::EmptyKey("=1".into()))
        );
    }

    #[test]
    fn typed_values_report_the_expected_kind() {
        assert_eq!(parse_value::<u64>("k", "12", "integer"), Ok(12));
        let err = parse_value::<f64>("critical.beta", "abc", "float").unwrap_err();
        assert_eq!(err.to_string(), "Invalid float value for critical.beta: 'abc'");
    }

    #[test]
    fn list_drops_blank_entries() {
        assert_eq!(parse_list("C2H6, C3H8,,"), vec!["C2H6", "C3H8"]);
        assert!(parse_list("").is_empty());
    }
}
