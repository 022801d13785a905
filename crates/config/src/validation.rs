//! Validation helpers for configuration values
//!
//! Each config section implements `ConfigSection`, which includes
//! validation and merging.

pub use crate::error::ValidationError;
use std::path::{Component, Path};

/// Trait for configuration sections that can validate themselves
pub trait ConfigSection: Default {
    /// Validates the section. `Ok` means every field is acceptable.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Merges another config section into this one; `other` wins
    fn merge(&mut self, other: Self);

    /// Returns the section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within an inclusive range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a name is exactly one normal path component
    ///
    /// Rejects separators, `.` and `..` so the name cannot escape the
    /// directory it is joined onto.
    pub fn file_name(value: &str, field: &str) -> Result<(), ValidationError> {
        Self::not_empty(value, field)?;

        let mut components = Path::new(value).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

        if single && !value.contains('\\') {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                "must be a plain file name without path separators",
                value,
            ))
        }
    }

    /// Validates that a URL uses the http or https scheme
    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        let rest = value
            .strip_prefix("http://")
            .or_else(|| value.strip_prefix("https://"));

        match rest {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(ValidationError::with_value(
                field,
                "must be an http:// or https:// URL",
                value,
            )),
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
