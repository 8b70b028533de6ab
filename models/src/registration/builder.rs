use super::RegistrationRequest;
use crate::ErrorLocation;
use crate::error::model_error::ModelError;

use std::panic::Location;

use serde_json::{Map, Value};

/// Collects registration fields as the user types them.
///
/// Doubles as the synchronizer's input buffer: fields are set and cleared one
/// at a time and [`build`](Self::build) produces the request on submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationRequestBuilder {
    fields: Map<String, Value>,
}

impl RegistrationRequestBuilder {
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(key, value);
        self
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove_field(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// True when nothing worth sending has been entered.
    ///
    /// Null values and empty strings do not count as input.
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|value| match value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            _ => false,
        })
    }

    /// Build the request, rejecting an empty submission.
    #[track_caller]
    pub fn build(self) -> Result<RegistrationRequest, ModelError> {
        if self.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Registration must contain at least one field"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(RegistrationRequest(self.fields))
    }
}
