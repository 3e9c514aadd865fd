//! Stock attribute validators
//!
//! All validators skip null and unknown values; presence and type checks are
//! the planning engine's job.

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{Diagnostic, Dynamic};

/// Restricts a string attribute to a fixed allow-list.
pub struct OneOf {
    allowed: Vec<&'static str>,
}

impl OneOf {
    pub fn new(allowed: &[&'static str]) -> Box<Self> {
        Box::new(Self {
            allowed: allowed.to_vec(),
        })
    }
}

impl Validator for OneOf {
    fn description(&self) -> String {
        format!("value must be one of {:?}", self.allowed)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Dynamic::String(value) = &request.config_value {
            if !self.allowed.contains(&value.as_str()) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", request.path),
                        format!("'{}' is not one of {:?}", value, self.allowed),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Bounds the length of a string attribute.
pub struct StringLength {
    min: Option<usize>,
    max: Option<usize>,
}

impl StringLength {
    pub fn between(min: usize, max: usize) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn at_least(min: usize) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: None,
        })
    }

    pub fn at_most(max: usize) -> Box<Self> {
        Box::new(Self {
            min: None,
            max: Some(max),
        })
    }
}

impl Validator for StringLength {
    fn description(&self) -> String {
        format!("string length must be within {:?}..{:?}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Dynamic::String(value) = &request.config_value {
            if let Some(min) = self.min {
                if value.len() < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} is too short", request.path),
                            format!("minimum length is {}, got {}", min, value.len()),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if value.len() > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} is too long", request.path),
                            format!("maximum length is {}, got {}", max, value.len()),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Requires a string attribute to match a regular expression.
pub struct RegexMatch {
    pattern: regex::Regex,
    what: String,
}

impl RegexMatch {
    pub fn new(pattern: &str, what: &str) -> Box<Self> {
        Box::new(Self {
            pattern: regex::Regex::new(pattern).expect("invalid validator pattern"),
            what: what.to_string(),
        })
    }
}

impl Validator for RegexMatch {
    fn description(&self) -> String {
        format!("value must be {}", self.what)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Dynamic::String(value) = &request.config_value {
            if !self.pattern.is_match(value) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", request.path),
                        format!("'{}' must be {}", value, self.what),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Bounds a number attribute.
pub struct NumberRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberRange {
    pub fn between(min: f64, max: f64) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn at_least(min: f64) -> Box<Self> {
        Box::new(Self {
            min: Some(min),
            max: None,
        })
    }
}

impl Validator for NumberRange {
    fn description(&self) -> String {
        format!("number must be within {:?}..{:?}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();

        if let Dynamic::Number(value) = request.config_value {
            if let Some(min) = self.min {
                if value < min {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} is too small", request.path),
                            format!("must be at least {}, got {}", min, value),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
            if let Some(max) = self.max {
                if value > max {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("{} is too large", request.path),
                            format!("must be at most {}, got {}", max, value),
                        )
                        .with_attribute(request.path.clone()),
                    );
                }
            }
        }

        ValidatorResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    fn run(validator: &dyn Validator, value: Dynamic) -> Vec<Diagnostic> {
        validator
            .validate(ValidatorRequest {
                config_value: value,
                path: AttributePath::new("field"),
            })
            .diagnostics
    }

    #[test]
    fn one_of_accepts_listed_values() {
        let v = OneOf::new(&["sftp", "ftp", "s3"]);
        assert!(run(v.as_ref(), Dynamic::String("sftp".to_string())).is_empty());
    }

    #[test]
    fn one_of_rejects_unlisted_values() {
        let v = OneOf::new(&["sftp", "ftp", "s3"]);
        let diags = run(v.as_ref(), Dynamic::String("gopher".to_string()));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].detail.contains("gopher"));
    }

    #[test]
    fn one_of_skips_null_and_unknown() {
        let v = OneOf::new(&["a"]);
        assert!(run(v.as_ref(), Dynamic::Null).is_empty());
        assert!(run(v.as_ref(), Dynamic::Unknown).is_empty());
    }

    #[test]
    fn string_length_bounds() {
        let v = StringLength::between(3, 5);
        assert!(run(v.as_ref(), Dynamic::String("abcd".to_string())).is_empty());
        assert_eq!(run(v.as_ref(), Dynamic::String("ab".to_string())).len(), 1);
        assert_eq!(
            run(v.as_ref(), Dynamic::String("abcdef".to_string())).len(),
            1
        );
    }

    #[test]
    fn regex_match_checks_pattern() {
        let v = RegexMatch::new(r"^[a-z][a-z0-9_]*$", "a lowercase identifier");
        assert!(run(v.as_ref(), Dynamic::String("backup_sync".to_string())).is_empty());
        assert_eq!(
            run(v.as_ref(), Dynamic::String("Bad Name".to_string())).len(),
            1
        );
    }

    #[test]
    fn number_range_bounds() {
        let v = NumberRange::between(1.0, 65535.0);
        assert!(run(v.as_ref(), Dynamic::Number(22.0)).is_empty());
        assert_eq!(run(v.as_ref(), Dynamic::Number(0.0)).len(), 1);
        assert_eq!(run(v.as_ref(), Dynamic::Number(70000.0)).len(), 1);
    }
}
