//! Request field checks shared by the DTOs.

use crate::error::{ApiError, FieldError};

/// Collects field errors and turns them into a single 400 response.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.errors.push(FieldError {
                field: field.into(),
                message: message.into(),
            });
        }
    }

    /// Character length of `value` must be within `min..=max`.
    pub fn length(&mut self, value: &str, min: usize, max: usize, field: &str, message: &str) {
        let len = value.chars().count();
        self.check((min..=max).contains(&len), field, message);
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failure() {
        let mut v = Validator::new();
        v.length("abc", 5, 10, "street", "Street address is required");
        v.length("ok", 2, 10, "city", "City is required");
        v.check(false, "quantity", "Quantity must be between 1 and 100");

        match v.finish() {
            Err(ApiError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["street", "quantity"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut v = Validator::new();
        v.length("éé", 2, 2, "name", "bad");
        assert!(v.finish().is_ok());
    }
}
