//! Text checks applied to values read from the page.
//!
//! A failed check is a finding, not an error: it is logged and recorded in
//! the report, and the stage carries on.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// What a value read from the page is expected to look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    /// Byte-for-byte equal. Case and whitespace count.
    Exact(String),
    /// Contains the fragment somewhere.
    Contains(String),
}

impl Expectation {
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Self::Exact(expected) => actual == expected,
            Self::Contains(fragment) => actual.contains(fragment.as_str()),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "equals '{}'", s),
            Self::Contains(s) => write!(f, "contains '{}'", s),
        }
    }
}

/// Result of one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub expectation: Expectation,
    pub actual: String,
    pub passed: bool,
}

impl CheckOutcome {
    /// Evaluate `actual` against `expectation`.
    pub fn evaluate(name: impl Into<String>, expectation: Expectation, actual: &str) -> Self {
        let passed = expectation.matches(actual);
        Self {
            name: name.into(),
            expectation,
            actual: actual.to_string(),
            passed,
        }
    }

    /// Log the outcome. `success` is the line shown when the check passes;
    /// a failure always includes the observed value.
    pub fn log(&self, success: &str) {
        if self.passed {
            info!("SUCCESS: {}", success);
        } else {
            warn!("FAILURE: Unexpected {}: '{}'", self.name, self.actual);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_placeholder_passes() {
        let outcome = CheckOutcome::evaluate(
            "search placeholder",
            Expectation::Exact("Search videos...".into()),
            "Search videos...",
        );
        assert!(outcome.passed);
    }

    #[test]
    fn test_exact_is_whitespace_and_case_sensitive() {
        let expected = Expectation::Exact("Search videos...".into());
        for actual in [
            " Search videos...",
            "Search videos... ",
            "search videos...",
            "Search videos",
            "Buscar videos...",
            "",
        ] {
            let outcome = CheckOutcome::evaluate("search placeholder", expected.clone(), actual);
            assert!(!outcome.passed, "'{}' should not match", actual);
            assert_eq!(outcome.actual, actual);
        }
    }

    #[test]
    fn test_contains_title() {
        let expected = Expectation::Contains("Mock Video".into());
        assert!(CheckOutcome::evaluate("video title", expected.clone(), "Mock Video #1").passed);
        assert!(!CheckOutcome::evaluate("video title", expected.clone(), "Featured Clip").passed);
        assert!(!CheckOutcome::evaluate("video title", expected, "mock video #1").passed);
    }

    #[test]
    fn test_display() {
        assert_eq!(Expectation::Exact("a".into()).to_string(), "equals 'a'");
        assert_eq!(Expectation::Contains("b".into()).to_string(), "contains 'b'");
    }

    #[test]
    fn test_serialize_outcome() {
        let outcome = CheckOutcome::evaluate(
            "video title",
            Expectation::Contains("Mock Video".into()),
            "Featured Clip",
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["expectation"]["kind"], "contains");
        assert_eq!(json["expectation"]["value"], "Mock Video");
        assert_eq!(json["actual"], "Featured Clip");
        assert_eq!(json["passed"], false);
    }
}
