use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Name of a catalog section (e.g., `Products`).
///
/// Sections are keyed by the `defaults.name` field of their document, so the
/// same string shows up in request envelopes and registry lookups.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionName(pub String);

/// Stable identifier for a remote operation (the wire `Action`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationName(pub String);

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionName {
    fn from(value: &str) -> Self {
        SectionName(value.to_string())
    }
}

impl From<&str> for OperationName {
    fn from(value: &str) -> Self {
        OperationName(value.to_string())
    }
}

/// Wire type a scalar value is coerced into before emission.
///
/// Unlike section or operation names there is no open-ended variant: an
/// unknown type in a section document is a load error, since the engine
/// would not know how to coerce it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ValueType {
    #[default]
    String,
    Boolean,
    Number,
    Date,
    Raw,
}

/// How a key/value parameter is spelled on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum KeyValueShape {
    /// `<wire>.<i>.Key` / `<wire>.<i>.Value` pairs with 1-based `i`.
    Indexed,
    /// `<wire>.<key>` → value, for flat attribute lists.
    Flat,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::Date => "date",
            ValueType::Raw => "raw",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "string" => Some(ValueType::String),
            "boolean" => Some(ValueType::Boolean),
            "number" => Some(ValueType::Number),
            "date" => Some(ValueType::Date),
            "raw" => Some(ValueType::Raw),
            _ => None,
        }
    }
}

impl KeyValueShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyValueShape::Indexed => "indexed",
            KeyValueShape::Flat => "flat",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "indexed" => Some(KeyValueShape::Indexed),
            "flat" => Some(KeyValueShape::Flat),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        ValueType::from_str(&value).ok_or_else(|| {
            D::Error::custom(format!(
                "unknown value type '{value}' (expected string|boolean|number|date|raw)"
            ))
        })
    }
}

impl Serialize for KeyValueShape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KeyValueShape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        KeyValueShape::from_str(&value).ok_or_else(|| {
            D::Error::custom(format!(
                "unknown key_value shape '{value}' (expected indexed|flat)"
            ))
        })
    }
}
