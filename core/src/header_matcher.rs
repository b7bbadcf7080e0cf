//! `HeaderMatcher`: One compiled header predicate.
//!
//! Compiled from [`HeaderMatchSpec`] at config time. Evaluation is pure and
//! allocation-free unless a header name repeats (the values are then joined
//! with `,` before comparison).

use crate::{HeaderMap, HeaderMatchSpec, StringMatcher, TapError};
use std::borrow::Cow;

/// What a [`HeaderMatcher`] checks about the header value.
#[derive(Debug, Clone)]
pub enum HeaderMatchKind {
    /// String comparison against the value.
    Value(StringMatcher),
    /// Value parsed as `i64` falls in `[start, end)`.
    Range {
        /// Inclusive start.
        start: i64,
        /// Exclusive end.
        end: i64,
    },
    /// Header is present (`true`) or absent (`false`).
    Present(bool),
}

/// A compiled header predicate.
///
/// # INV: absent header → false
///
/// If the header is missing, the predicate is `false` regardless of
/// `invert`. The one exception is a presence check, whose answer is
/// defined for missing headers and is then inverted as usual.
///
/// # Example
///
/// ```
/// use httptap::{HeaderMap, HeaderMatcher, StringMatcher};
///
/// let matcher = HeaderMatcher::value("foo", StringMatcher::exact("bar").unwrap());
/// assert!(matcher.matches(&HeaderMap::from(vec![("Foo", "bar")])));
/// assert!(!matcher.matches(&HeaderMap::from(vec![("foo", "baz")])));
/// ```
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: String,
    kind: HeaderMatchKind,
    invert: bool,
}

impl HeaderMatcher {
    /// Match the header value with a string matcher.
    pub fn value(name: impl Into<String>, matcher: StringMatcher) -> Self {
        Self {
            name: name.into(),
            kind: HeaderMatchKind::Value(matcher),
            invert: false,
        }
    }

    /// Match on header presence.
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: HeaderMatchKind::Present(true),
            invert: false,
        }
    }

    /// Invert the result.
    #[must_use]
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Compile a config-level header spec.
    ///
    /// # Errors
    ///
    /// - [`TapError::EmptyHeaderName`] if `name` is empty
    /// - [`TapError::ConflictingSpecifiers`] if more than one `*_match` is set
    /// - [`TapError::EmptyRange`] if a range has `start >= end`
    /// - pattern errors from [`StringMatcher`]
    pub fn from_spec(spec: &HeaderMatchSpec) -> Result<Self, TapError> {
        if spec.name.is_empty() {
            return Err(TapError::EmptyHeaderName);
        }

        let specifiers = [
            spec.exact_match.is_some(),
            spec.regex_match.is_some(),
            spec.range_match.is_some(),
            spec.present_match.is_some(),
            spec.prefix_match.is_some(),
            spec.suffix_match.is_some(),
            spec.contains_match.is_some(),
        ];
        let count = specifiers.iter().filter(|set| **set).count();
        if count > 1 {
            return Err(TapError::ConflictingSpecifiers {
                name: spec.name.clone(),
                count,
            });
        }

        let kind = if let Some(v) = &spec.exact_match {
            HeaderMatchKind::Value(StringMatcher::exact(v.as_str())?)
        } else if let Some(p) = &spec.regex_match {
            HeaderMatchKind::Value(StringMatcher::regex(p)?)
        } else if let Some(range) = spec.range_match {
            if range.start >= range.end {
                return Err(TapError::EmptyRange {
                    name: spec.name.clone(),
                    start: range.start,
                    end: range.end,
                });
            }
            HeaderMatchKind::Range {
                start: range.start,
                end: range.end,
            }
        } else if let Some(v) = &spec.prefix_match {
            HeaderMatchKind::Value(StringMatcher::prefix(v.as_str())?)
        } else if let Some(v) = &spec.suffix_match {
            HeaderMatchKind::Value(StringMatcher::suffix(v.as_str())?)
        } else if let Some(v) = &spec.contains_match {
            HeaderMatchKind::Value(StringMatcher::contains(v.as_str())?)
        } else {
            // No specifier means presence.
            HeaderMatchKind::Present(spec.present_match.unwrap_or(true))
        };

        Ok(Self {
            name: spec.name.clone(),
            kind,
            invert: spec.invert_match,
        })
    }

    /// The header name this predicate inspects.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The match kind.
    #[must_use]
    pub fn kind(&self) -> &HeaderMatchKind {
        &self.kind
    }

    /// Whether the result is inverted.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Evaluate against a header map.
    #[must_use]
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        let value = header_value(headers, &self.name);

        let matched = match (&self.kind, value) {
            (HeaderMatchKind::Present(expected), value) => value.is_some() == *expected,
            // INV: absent header → false, not subject to inversion
            (_, None) => return false,
            (HeaderMatchKind::Value(m), Some(value)) => m.matches(&value),
            (HeaderMatchKind::Range { start, end }, Some(value)) => value
                .trim()
                .parse::<i64>()
                .is_ok_and(|n| *start <= n && n < *end),
        };

        matched != self.invert
    }
}

/// Evaluate a matcher set. An empty set never matches.
#[must_use]
pub fn matches_all(headers: &HeaderMap, matchers: &[HeaderMatcher]) -> bool {
    !matchers.is_empty() && matchers.iter().all(|m| m.matches(headers))
}

/// All values for `name`, comma-joined when the name repeats.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    let mut values = headers.get_all(name);
    let first = values.next()?;
    match values.next() {
        None => Some(Cow::Borrowed(first)),
        Some(second) => {
            let mut joined = format!("{first},{second}");
            for v in values {
                joined.push(',');
                joined.push_str(v);
            }
            Some(Cow::Owned(joined))
        }
    }
}
