//! Stock default values for optional attributes

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::Dynamic;

pub struct StaticString {
    value: &'static str,
}

impl StaticString {
    pub fn create(value: &'static str) -> Box<Self> {
        Box::new(Self { value })
    }
}

impl Default for StaticString {
    fn description(&self) -> String {
        format!("defaults to \"{}\"", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: Dynamic::String(self.value.to_string()),
        }
    }
}

pub struct StaticBool {
    value: bool,
}

impl StaticBool {
    pub fn create(value: bool) -> Box<Self> {
        Box::new(Self { value })
    }
}

impl Default for StaticBool {
    fn description(&self) -> String {
        format!("defaults to {}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: Dynamic::Bool(self.value),
        }
    }
}

pub struct StaticNumber {
    value: f64,
}

impl StaticNumber {
    pub fn create(value: f64) -> Box<Self> {
        Box::new(Self { value })
    }
}

impl Default for StaticNumber {
    fn description(&self) -> String {
        format!("defaults to {}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: Dynamic::Number(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    #[test]
    fn static_defaults_produce_their_values() {
        let request = || DefaultRequest {
            path: AttributePath::new("field"),
        };

        assert_eq!(
            StaticString::create("none").default_value(request()).value,
            Dynamic::String("none".to_string())
        );
        assert_eq!(
            StaticBool::create(false).default_value(request()).value,
            Dynamic::Bool(false)
        );
        assert_eq!(
            StaticNumber::create(30.0).default_value(request()).value,
            Dynamic::Number(30.0)
        );
    }
}
