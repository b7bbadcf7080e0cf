//! `StringMatcher`: Runtime string matching for header values.
//!
//! Compiled once from config at [`TapConfig`](crate::TapConfig) construction,
//! evaluated on every header scan.

use crate::{TapError, MAX_PATTERN_LENGTH, MAX_REGEX_PATTERN_LENGTH};

/// String matching strategy for a header value.
///
/// All literal comparisons are case-sensitive. Regex matching is a
/// whole-value match: the pattern is anchored at both ends.
///
/// # Example
///
/// ```
/// use httptap::StringMatcher;
///
/// let matcher = StringMatcher::prefix("/api/").unwrap();
/// assert!(matcher.matches("/api/users"));
/// assert!(!matcher.matches("/users"));
///
/// let matcher = StringMatcher::regex(r"user-\d+").unwrap();
/// assert!(matcher.matches("user-123"));
/// assert!(!matcher.matches("xuser-123")); // anchored
/// ```
#[derive(Debug, Clone)]
pub enum StringMatcher {
    /// Exact string equality.
    Exact(String),
    /// String prefix match.
    Prefix(String),
    /// String suffix match.
    Suffix(String),
    /// Substring contains match.
    Contains(String),
    /// Whole-value regular expression match (RE2 semantics, linear time).
    Regex(regex::Regex),
}

impl StringMatcher {
    /// Create an exact match.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::PatternTooLong`] above [`MAX_PATTERN_LENGTH`].
    pub fn exact(value: impl Into<String>) -> Result<Self, TapError> {
        literal(value.into()).map(Self::Exact)
    }

    /// Create a prefix match.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::PatternTooLong`] above [`MAX_PATTERN_LENGTH`].
    pub fn prefix(value: impl Into<String>) -> Result<Self, TapError> {
        literal(value.into()).map(Self::Prefix)
    }

    /// Create a suffix match.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::PatternTooLong`] above [`MAX_PATTERN_LENGTH`].
    pub fn suffix(value: impl Into<String>) -> Result<Self, TapError> {
        literal(value.into()).map(Self::Suffix)
    }

    /// Create a contains match.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::PatternTooLong`] above [`MAX_PATTERN_LENGTH`].
    pub fn contains(value: impl Into<String>) -> Result<Self, TapError> {
        literal(value.into()).map(Self::Contains)
    }

    /// Create a whole-value regex match.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::PatternTooLong`] above [`MAX_REGEX_PATTERN_LENGTH`],
    /// or [`TapError::InvalidPattern`] if the pattern does not compile.
    pub fn regex(pattern: &str) -> Result<Self, TapError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(TapError::PatternTooLong {
                len: pattern.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }
        regex::Regex::new(&format!("^(?:{pattern})$"))
            .map(Self::Regex)
            .map_err(|e| TapError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Check a header value against this matcher.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Self::Exact(value) => input == value,
            Self::Prefix(value) => input.starts_with(value.as_str()),
            Self::Suffix(value) => input.ends_with(value.as_str()),
            Self::Contains(value) => input.contains(value.as_str()),
            Self::Regex(re) => re.is_match(input),
        }
    }
}

fn literal(value: String) -> Result<String, TapError> {
    if value.len() > MAX_PATTERN_LENGTH {
        return Err(TapError::PatternTooLong {
            len: value.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }
    Ok(value)
}
