//! Deserializable representation of a section document (`catalog/*.json`).
//!
//! The types mirror `schema/section.schema.json` so loaders and tests can
//! reason about operations without ad-hoc JSON handling. Documents are raw
//! input: enum references are still names and shapes are still flags. Use
//! `SectionRegistry::register_section` to turn them into resolved
//! descriptors.

use crate::catalog::identity::{KeyValueShape, OperationName, ValueType};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SECTION_SCHEMA_VERSION: &str = "flatwire_section_v1";

#[derive(Clone, Debug, Deserialize)]
/// Full section document as stored on disk.
pub struct SectionDocument {
    pub schema_version: String,
    pub defaults: RequestDefaults,
    #[serde(default)]
    pub enums: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub types: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub operations: Vec<OperationDocument>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
/// Static request metadata shared by every operation in a section.
pub struct RequestDefaults {
    pub name: String,
    pub group: String,
    pub path: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
/// Per-operation override of the section defaults; unset fields inherit.
pub struct DefaultsOverride {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// One remote operation and its parameter contract.
pub struct OperationDocument {
    pub name: OperationName,
    #[serde(default)]
    pub params: Vec<ParameterDocument>,
    #[serde(default)]
    pub defaults: Option<DefaultsOverride>,
    #[serde(default)]
    pub response_path: Option<String>,
    /// Free-form note for operations that only partially model the remote
    /// contract (e.g., fixed-index composite lists).
    #[serde(default)]
    pub limitation: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// Declared parameter; shape flags are checked when the section registers.
pub struct ParameterDocument {
    pub name: String,
    #[serde(default)]
    pub wire_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub list: bool,
    #[serde(default)]
    pub key_value: Option<KeyValueShape>,
    #[serde(default, rename = "enum")]
    pub enum_ref: Option<EnumRefDocument>,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub fields: Option<Vec<ParameterDocument>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
/// Enum reference: a name resolved at registration, or values inlined.
pub enum EnumRefDocument {
    Named(String),
    Inline(Vec<String>),
}

impl ParameterDocument {
    /// Shorthand for a required string scalar, used by hand-built sections.
    pub fn required(name: &str) -> Self {
        Self {
            required: true,
            ..Self::optional(name)
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wire_name: None,
            required: false,
            list: false,
            key_value: None,
            enum_ref: None,
            value_type: ValueType::String,
            fields: None,
        }
    }

    pub fn wire_name(mut self, wire_name: &str) -> Self {
        self.wire_name = Some(wire_name.to_string());
        self
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn key_value(mut self, shape: KeyValueShape) -> Self {
        self.key_value = Some(shape);
        self
    }

    pub fn enum_named(mut self, name: &str) -> Self {
        self.enum_ref = Some(EnumRefDocument::Named(name.to_string()));
        self
    }

    pub fn of_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn fields(mut self, fields: Vec<ParameterDocument>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Parse a section document from a JSON string without further validation.
pub fn parse_section_document(raw: &str) -> Result<SectionDocument> {
    let document: SectionDocument =
        serde_json::from_str(raw).context("parsing section document")?;
    Ok(document)
}
