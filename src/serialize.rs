//! Serialization engine: descriptors plus arguments to wire parameters.
//!
//! One generic interpreter handles every operation. Parameters are visited
//! in declaration order and the first failure is returned, so the same
//! input always reports the same error. Flattening rules:
//!
//! - scalar: `wire_name=value`
//! - list: `wire_name.<i>=value` for 1-based `i`, in input order
//! - key/value (indexed): `wire_name.<i>.Key=key`, `wire_name.<i>.Value=value`
//! - key/value (flat): `wire_name.<key>=value`
//! - composite: each field at `wire_name.<field wire_name>`
//!
//! Lists only carry scalars. Operations whose remote contract takes a list
//! of composite entries declare individual scalars with a literal index in
//! their wire names (see `GetMyFeesEstimate`), which caps them at a single
//! entry per request.

use crate::args::{ArgValue, Args};
use crate::catalog::{KeyValueShape, OperationDescriptor, ParameterDescriptor, ParameterShape};
use crate::coerce::{coerce, stringify};
use crate::error::SerializationError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Envelope parameter carrying the operation name.
pub const ACTION_PARAMETER: &str = "Action";
/// Envelope parameter carrying the effective API version.
pub const VERSION_PARAMETER: &str = "Version";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct WireParameter {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
/// Ordered wire parameters ready for the transport layer.
pub struct WireParameters(Vec<WireParameter>);

impl WireParameters {
    fn push(&mut self, name: String, value: String) {
        self.0.push(WireParameter { name, value });
    }

    /// Value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WireParameter> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|param| param.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(name, value)` pairs in emission order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|param| (param.name.clone(), param.value.clone()))
            .collect()
    }

    /// Parameters as a JSON object in emission order.
    pub fn to_json_object(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|param| (param.name.clone(), Value::String(param.value.clone())))
            .collect();
        Value::Object(map)
    }
}

impl IntoIterator for WireParameters {
    type Item = WireParameter;
    type IntoIter = std::vec::IntoIter<WireParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a WireParameters {
    type Item = &'a WireParameter;
    type IntoIter = std::slice::Iter<'a, WireParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validate `args` against `operation` and flatten them into wire parameters.
///
/// On success the sequence starts with the `Action`/`Version` envelope,
/// followed by parameters in declaration order. Pure and synchronous; the
/// descriptor is only read.
pub fn serialize(
    operation: &OperationDescriptor,
    args: &Args,
) -> Result<WireParameters, SerializationError> {
    let mut out = WireParameters::default();
    out.push(ACTION_PARAMETER.to_string(), operation.name().0.clone());
    out.push(
        VERSION_PARAMETER.to_string(),
        operation.defaults().version.clone(),
    );

    match flatten_group(operation.parameters(), Lookup::Args(args), None, None, &mut out) {
        Ok(()) => {
            tracing::debug!(
                section = %operation.section(),
                operation = %operation.name(),
                emitted = out.len(),
                "serialized request parameters"
            );
            Ok(out)
        }
        Err(err) => {
            tracing::debug!(
                section = %operation.section(),
                operation = %operation.name(),
                parameter = err.parameter(),
                reason = %err.reason(),
                "request parameters rejected"
            );
            Err(err)
        }
    }
}

/// Where a group of parameters reads its values from.
#[derive(Clone, Copy)]
enum Lookup<'a> {
    Args(&'a Args),
    Fields(&'a [(String, ArgValue)]),
}

impl<'a> Lookup<'a> {
    fn get(self, name: &str) -> Option<&'a ArgValue> {
        match self {
            Lookup::Args(args) => args.get(name),
            Lookup::Fields(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value)
                .filter(|value| !value.is_null()),
        }
    }
}

fn flatten_group(
    params: &[ParameterDescriptor],
    lookup: Lookup<'_>,
    logical_prefix: Option<&str>,
    wire_prefix: Option<&str>,
    out: &mut WireParameters,
) -> Result<(), SerializationError> {
    for descriptor in params {
        let logical = join_path(logical_prefix, descriptor.logical_name());
        let Some(value) = lookup.get(descriptor.logical_name()) else {
            if descriptor.required() {
                return Err(SerializationError::MissingRequiredParameter { parameter: logical });
            }
            continue;
        };
        let wire = join_path(wire_prefix, descriptor.wire_name());
        flatten_parameter(descriptor, value, &logical, &wire, out)?;
    }
    Ok(())
}

fn flatten_parameter(
    descriptor: &ParameterDescriptor,
    value: &ArgValue,
    logical: &str,
    wire: &str,
    out: &mut WireParameters,
) -> Result<(), SerializationError> {
    match descriptor.shape() {
        ParameterShape::Scalar => {
            let coerced = scalar_value(descriptor, value, logical)?;
            out.push(wire.to_string(), coerced);
        }
        ParameterShape::List => {
            let ArgValue::List(items) = value else {
                return Err(malformed(logical, "list", value));
            };
            if items.is_empty() && descriptor.required() {
                return Err(SerializationError::EmptyRequiredList {
                    parameter: logical.to_string(),
                });
            }
            for (idx, item) in items.iter().enumerate() {
                let coerced = scalar_value(descriptor, item, logical)?;
                out.push(format!("{wire}.{}", idx + 1), coerced);
            }
        }
        ParameterShape::KeyValue(shape) => {
            let ArgValue::Map(entries) = value else {
                return Err(malformed(logical, "map", value));
            };
            if entries.is_empty() && descriptor.required() {
                return Err(SerializationError::EmptyRequiredList {
                    parameter: logical.to_string(),
                });
            }
            let mut seen = BTreeSet::new();
            for (idx, (key, item)) in entries.iter().enumerate() {
                let problem = if key.is_empty() {
                    Some("empty key")
                } else if !seen.insert(key.as_str()) {
                    Some("duplicate key")
                } else if *shape == KeyValueShape::Flat && key.contains('.') {
                    // Flat keys become wire path segments.
                    Some("key containing '.'")
                } else {
                    None
                };
                if let Some(found) = problem {
                    return Err(SerializationError::MalformedInputShape {
                        parameter: logical.to_string(),
                        expected: "unique, non-empty map keys",
                        found,
                    });
                }
                let coerced = scalar_value(descriptor, item, logical)?;
                match shape {
                    KeyValueShape::Indexed => {
                        let position = idx + 1;
                        out.push(format!("{wire}.{position}.Key"), key.clone());
                        out.push(format!("{wire}.{position}.Value"), coerced);
                    }
                    KeyValueShape::Flat => out.push(format!("{wire}.{key}"), coerced),
                }
            }
        }
        ParameterShape::Struct(fields) => {
            let ArgValue::Map(entries) = value else {
                return Err(malformed(logical, "map", value));
            };
            flatten_group(fields, Lookup::Fields(entries), Some(logical), Some(wire), out)?;
        }
    }
    Ok(())
}

/// Enum check, then coercion, for one scalar value.
fn scalar_value(
    descriptor: &ParameterDescriptor,
    value: &ArgValue,
    logical: &str,
) -> Result<String, SerializationError> {
    if let Some(allowed) = descriptor.enum_ref() {
        // Non-scalars fall through to coercion, which reports the mismatch.
        if let Some(candidate) = stringify(value) {
            if !allowed.contains(&candidate) {
                return Err(SerializationError::InvalidEnumValue {
                    parameter: logical.to_string(),
                    value: candidate,
                    enum_name: allowed.name().to_string(),
                    allowed: allowed.values().to_vec(),
                });
            }
        }
    }
    coerce(descriptor.value_type(), value).map_err(|err| SerializationError::TypeMismatch {
        parameter: logical.to_string(),
        expected: err.expected,
        found: err.found,
    })
}

fn malformed(logical: &str, expected: &'static str, value: &ArgValue) -> SerializationError {
    SerializationError::MalformedInputShape {
        parameter: logical.to_string(),
        expected,
        found: value.kind(),
    }
}

fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_string(),
    }
}
