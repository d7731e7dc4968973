//! Assertions for read-back validation.
//!
//! Every check names the screen and field it was made on, so a failure
//! carries enough context to be reported without the scenario adding any.

use crate::result::{ProbeError, ProbeResult};
use std::fmt::Display;

/// Assertion helpers bound to one screen
#[derive(Debug, Clone, Copy)]
pub struct Assertion {
    screen: &'static str,
}

impl Assertion {
    /// Assertions for values read on `screen`
    #[must_use]
    pub const fn on(screen: &'static str) -> Self {
        Self { screen }
    }

    /// Screen name used in failures
    #[must_use]
    pub const fn screen(&self) -> &'static str {
        self.screen
    }

    /// Assert two values are equal
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] if they differ.
    pub fn equals<T: PartialEq + Display + ?Sized>(
        &self,
        field: &str,
        expected: &T,
        actual: &T,
    ) -> ProbeResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(self.mismatch(field, expected.to_string(), actual.to_string()))
        }
    }

    /// Assert rendered text equals `expected` after trimming
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] if the text differs.
    pub fn text(&self, field: &str, expected: &str, actual: &str) -> ProbeResult<()> {
        self.equals(field, expected.trim(), actual.trim())
    }

    /// Assert a control is in the expected checked state
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] if it is not.
    pub fn is_true(&self, field: &str, actual: bool) -> ProbeResult<()> {
        self.equals(field, &true, &actual)
    }

    /// Assert a string contains a substring
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] if it does not.
    pub fn contains(&self, field: &str, haystack: &str, needle: &str) -> ProbeResult<()> {
        if haystack.contains(needle) {
            Ok(())
        } else {
            Err(self.mismatch(
                field,
                format!("text containing {needle:?}"),
                haystack.to_string(),
            ))
        }
    }

    /// Compare labelled field lists pairwise, failing on the first
    /// difference.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] for the first differing field.
    pub fn fields(
        &self,
        expected: &[(&'static str, String)],
        actual: &[(&'static str, String)],
    ) -> ProbeResult<()> {
        for ((field, want), (_, got)) in expected.iter().zip(actual) {
            self.equals(field, want.as_str(), got.as_str())?;
        }
        Ok(())
    }

    fn mismatch(&self, field: &str, expected: String, actual: String) -> ProbeError {
        ProbeError::mismatch(self.screen, field, expected, actual)
    }
}
