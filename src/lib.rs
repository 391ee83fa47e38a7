//! Shared library for the flatwire request translator.
//!
//! The crate turns declarative operation catalogs (sections of operations
//! with typed, possibly list- or map-shaped parameters) plus a caller's
//! argument bag into the flattened `Name.Path.<i>=value` parameters that
//! MWS-style query APIs expect. Public items here form the contract the
//! helper binaries and embedding transports depend on: catalog loading and
//! lookup, the argument types, and the single `serialize` entry point.
//!
//! HTTP transport, request signing, retries, and response parsing live
//! outside this crate.

pub mod args;
pub mod catalog;
pub mod coerce;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod schema_loader;
pub mod serialize;

pub use args::{ArgValue, Args};
pub use catalog::repository::{global, init};
pub use catalog::{
    EnumRegistry, EnumSet, KeyValueShape, OperationDescriptor, OperationName, ParameterDescriptor,
    ParameterDocument, ParameterShape, RequestDefaults, Section, SectionDocument, SectionName,
    SectionRegistry, ValueType,
};
pub use error::{ReasonCode, SerializationError};
pub use schema_loader::SectionSchema;
pub use serialize::{
    ACTION_PARAMETER, VERSION_PARAMETER, WireParameter, WireParameters, serialize,
};

/// Parse caller arguments supplied as a JSON object string.
pub fn parse_args_json(raw: &str) -> anyhow::Result<Args> {
    use anyhow::Context;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Args::new());
    }
    let value: serde_json::Value =
        serde_json::from_str(trimmed).context("Unable to parse arguments as JSON")?;
    Args::from_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args_json_accepts_blank_and_objects() {
        assert!(parse_args_json("  ").unwrap().is_empty());
        let args = parse_args_json(r#"{"MarketplaceId": "ATVPDKIKX0DER", "ASINList": ["B1"]}"#)
            .unwrap();
        assert_eq!(args.len(), 2);
        assert!(parse_args_json("[1, 2]").is_err());
        assert!(parse_args_json("{not json").is_err());
    }
}
