//! Structured failures returned by the serialization engine.
//!
//! Every variant names the offending logical parameter (dotted for fields of
//! composite parameters) and maps to a stable `ReasonCode`, so callers can
//! branch on the reason without parsing messages.

use crate::catalog::ValueType;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    MissingRequiredParameter,
    InvalidEnumValue,
    TypeMismatch,
    EmptyRequiredList,
    MalformedInputShape,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::MissingRequiredParameter => "missing_required_parameter",
            ReasonCode::InvalidEnumValue => "invalid_enum_value",
            ReasonCode::TypeMismatch => "type_mismatch",
            ReasonCode::EmptyRequiredList => "empty_required_list",
            ReasonCode::MalformedInputShape => "malformed_input_shape",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SerializationError {
    #[error("missing required parameter {parameter}")]
    MissingRequiredParameter { parameter: String },

    #[error(
        "invalid value '{value}' for {parameter}; expected one of {enum_name} [{choices}]",
        choices = .allowed.join(", ")
    )]
    InvalidEnumValue {
        parameter: String,
        value: String,
        enum_name: String,
        allowed: Vec<String>,
    },

    #[error("type mismatch for {parameter}: expected {expected}, got {found}")]
    TypeMismatch {
        parameter: String,
        expected: ValueType,
        found: String,
    },

    #[error("required list parameter {parameter} is empty")]
    EmptyRequiredList { parameter: String },

    #[error("malformed input for {parameter}: expected {expected}, got {found}")]
    MalformedInputShape {
        parameter: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl SerializationError {
    /// Logical name of the parameter that failed.
    pub fn parameter(&self) -> &str {
        match self {
            SerializationError::MissingRequiredParameter { parameter }
            | SerializationError::InvalidEnumValue { parameter, .. }
            | SerializationError::TypeMismatch { parameter, .. }
            | SerializationError::EmptyRequiredList { parameter }
            | SerializationError::MalformedInputShape { parameter, .. } => parameter,
        }
    }

    pub fn reason(&self) -> ReasonCode {
        match self {
            SerializationError::MissingRequiredParameter { .. } => {
                ReasonCode::MissingRequiredParameter
            }
            SerializationError::InvalidEnumValue { .. } => ReasonCode::InvalidEnumValue,
            SerializationError::TypeMismatch { .. } => ReasonCode::TypeMismatch,
            SerializationError::EmptyRequiredList { .. } => ReasonCode::EmptyRequiredList,
            SerializationError::MalformedInputShape { .. } => ReasonCode::MalformedInputShape,
        }
    }

    /// JSON report used by the CLI: `{parameter, reason, message}`.
    pub fn to_json(&self) -> Value {
        json!({
            "parameter": self.parameter(),
            "reason": self.reason(),
            "message": self.to_string(),
        })
    }
}
