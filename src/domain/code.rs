use std::{fmt, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};

/// The inclusive range every group of a [`Code`] is drawn from.
pub const GROUP_RANGE: RangeInclusive<u16> = 100..=999;

/// A document-scoped code of the form `DDD-DDD`.
///
/// Both groups are three-digit numbers in [`GROUP_RANGE`], so neither group
/// has a leading zero. This is stricter than the corpus search pattern: text
/// such as `012-345` is found by a scan but is never a valid `Code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code {
    first: u16,
    second: u16,
}

impl Code {
    /// Creates a code from its two numeric groups.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::GroupOutOfRange`] if either group lies outside
    /// [`GROUP_RANGE`].
    pub fn from_groups(first: u16, second: u16) -> Result<Self, ParseError> {
        for group in [first, second] {
            if !GROUP_RANGE.contains(&group) {
                return Err(ParseError::GroupOutOfRange(group));
            }
        }
        Ok(Self { first, second })
    }

    /// Returns the first group.
    #[must_use]
    pub const fn first(&self) -> u16 {
        self.first
    }

    /// Returns the second group.
    #[must_use]
    pub const fn second(&self) -> u16 {
        self.second
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

/// Errors that can occur when parsing or constructing a [`Code`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The string is not of the form `DDD-DDD`.
    #[error("Invalid code format '{0}': expected DDD-DDD")]
    Syntax(String),

    /// A group is outside the permitted range.
    #[error("Invalid code group {0}: must be between 100 and 999")]
    GroupOutOfRange(u16),
}

impl FromStr for Code {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || ParseError::Syntax(s.to_string());

        let (first, second) = s.split_once('-').ok_or_else(syntax)?;
        let is_group = |g: &str| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit());
        if !is_group(first) || !is_group(second) {
            return Err(syntax());
        }

        // Three ASCII digits always fit in a u16
        let first = first.parse().map_err(|_| syntax())?;
        let second = second.parse().map_err(|_| syntax())?;
        Self::from_groups(first, second)
    }
}

impl TryFrom<String> for Code {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl TryFrom<&str> for Code {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn display_joins_groups_with_dash() {
        let code = Code::from_groups(123, 456).unwrap();
        assert_eq!(code.to_string(), "123-456");
    }

    #[test_case("100-100", 100, 100; "lower bound")]
    #[test_case("999-999", 999, 999; "upper bound")]
    #[test_case("482-107", 482, 107; "mixed")]
    fn parse_valid(input: &str, first: u16, second: u16) {
        let code: Code = input.parse().unwrap();
        assert_eq!(code.first(), first);
        assert_eq!(code.second(), second);
        assert_eq!(code.to_string(), input);
    }

    #[test_case(""; "empty")]
    #[test_case("123456"; "no dash")]
    #[test_case("12-345"; "short first group")]
    #[test_case("123-45"; "short second group")]
    #[test_case("1234-567"; "long first group")]
    #[test_case("12a-456"; "non digit")]
    #[test_case("+12-456"; "sign")]
    #[test_case("123-456-789"; "extra group")]
    fn parse_rejects_bad_syntax(input: &str) {
        assert!(matches!(input.parse::<Code>(), Err(ParseError::Syntax(_))));
    }

    #[test_case("012-345", 12; "leading zero first")]
    #[test_case("345-099", 99; "leading zero second")]
    #[test_case("000-000", 0; "zeros")]
    fn parse_rejects_groups_below_range(input: &str, group: u16) {
        assert_eq!(input.parse::<Code>(), Err(ParseError::GroupOutOfRange(group)));
    }

    #[test]
    fn from_groups_rejects_four_digit_group() {
        assert_eq!(
            Code::from_groups(100, 1000),
            Err(ParseError::GroupOutOfRange(1000))
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let code = Code::from_groups(321, 654).unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"321-654\"");

        let parsed: Code = serde_json::from_str("\"321-654\"").unwrap();
        assert_eq!(parsed, code);

        assert!(serde_json::from_str::<Code>("\"021-654\"").is_err());
    }
}
