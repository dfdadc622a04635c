//! Shared validation helpers for inbound HTTP adapters.
//!
//! Body fields are validated together so a response reports every failing
//! field at once, under `details.errors`, keyed by field name.

use serde_json::{Map, Value, json};

use crate::domain::Error;

/// Top-level message for a body that fails field validation.
pub(crate) const VALIDATION_FAILED_MESSAGE: &str = "Input payload validation failed";

/// Collects per-field validation failures for one request body.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    errors: Map<String, Value>,
}

impl FieldErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .insert(field.to_owned(), Value::String(message.into()));
    }

    /// Records the field failure and yields `None` so validation continues
    /// over the remaining fields.
    pub(crate) fn capture<T, E>(&mut self, field: &str, result: Result<T, E>) -> Option<T>
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(field, err.to_string());
                None
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the accumulated failures into a `422` error.
    pub(crate) fn into_error(self) -> Error {
        Error::validation_failed(VALIDATION_FAILED_MESSAGE)
            .with_details(json!({ "errors": Value::Object(self.errors) }))
    }

    /// Returns `Ok(value)` when no field failed, otherwise the bundled error.
    pub(crate) fn finish<T>(self, value: T) -> Result<T, Error> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self.into_error())
        }
    }
}
