//! JSON Schema contract for section documents.
//!
//! The canonical schema lives in `schema/section.schema.json` and is
//! compiled into the crate. Structural problems in a section file (missing
//! defaults, unknown keys, wrong flag types) are reported here with schema
//! paths, before serde ever sees the document.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

use crate::catalog::SECTION_SCHEMA_VERSION;

pub const CANONICAL_SECTION_SCHEMA_PATH: &str = "schema/section.schema.json";

const SECTION_SCHEMA_SOURCE: &str = include_str!("../schema/section.schema.json");
const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

/// Compiled validator for section documents.
pub struct SectionSchema {
    pub schema_version: String,
    compiled: JSONSchema,
}

impl SectionSchema {
    pub fn compile() -> Result<Self> {
        let raw: Value = serde_json::from_str(SECTION_SCHEMA_SOURCE)
            .with_context(|| format!("parsing {CANONICAL_SECTION_SCHEMA_PATH}"))?;

        let schema_version = raw
            .pointer(SCHEMA_VERSION_POINTER)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("schema missing schema_version const"))?
            .to_string();
        if schema_version != SECTION_SCHEMA_VERSION {
            bail!(
                "{} declares schema_version '{}' but the loader expects '{}'",
                CANONICAL_SECTION_SCHEMA_PATH,
                schema_version,
                SECTION_SCHEMA_VERSION
            );
        }

        let compiled = JSONSchema::compile(&raw)
            .map_err(|err| anyhow!("compiling {CANONICAL_SECTION_SCHEMA_PATH}: {err}"))?;
        Ok(Self {
            schema_version,
            compiled,
        })
    }

    /// Validate a parsed section document, joining every schema error.
    pub fn validate(&self, value: &Value, label: &str) -> Result<()> {
        if let Err(errors) = self.compiled.validate(value) {
            let details = errors
                .map(|err| format!("{} at {}", err, err.instance_path))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("section {} failed schema validation:\n{}", label, details);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SectionSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionSchema")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiles_canonical_schema() {
        let schema = SectionSchema::compile().unwrap();
        assert_eq!(schema.schema_version, SECTION_SCHEMA_VERSION);
    }

    #[test]
    fn accepts_well_formed_section() {
        let schema = SectionSchema::compile().unwrap();
        let doc = json!({
            "schema_version": "flatwire_section_v1",
            "defaults": {
                "name": "Products",
                "group": "Products",
                "path": "/Products/2011-10-01",
                "version": "2011-10-01"
            },
            "enums": {"ItemConditions": ["New", "Used"]},
            "operations": [
                {"name": "GetMatchingProduct", "params": [
                    {"name": "MarketplaceId", "required": true},
                    {
                        "name": "ASINList",
                        "wire_name": "ASINList.ASIN",
                        "list": true,
                        "required": true
                    }
                ]}
            ]
        });
        schema.validate(&doc, "inline").unwrap();
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        let schema = SectionSchema::compile().unwrap();
        let doc = json!({
            "schema_version": "flatwire_section_v1",
            "defaults": {"name": "Products", "group": "Products", "path": "/p", "version": "1"},
            "operations": [
                {"name": "Op", "params": [{"name": "A", "required": "yes", "colour": "red"}]}
            ]
        });
        let err = schema.validate(&doc, "inline").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("section inline failed schema validation"));
    }

    #[test]
    fn rejects_wrong_schema_version() {
        let schema = SectionSchema::compile().unwrap();
        let doc = json!({
            "schema_version": "flatwire_section_v2",
            "defaults": {"name": "X", "group": "X", "path": "/X", "version": "1"}
        });
        assert!(schema.validate(&doc, "inline").is_err());
    }
}
