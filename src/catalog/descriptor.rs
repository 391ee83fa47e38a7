//! Resolved, immutable descriptors consumed by the serialization engine.
//!
//! Descriptors are produced by `SectionRegistry::register_section` after
//! enum references resolve and shape flags are checked, so the engine can
//! interpret every operation uniformly without re-validating the catalog.

use crate::catalog::enums::EnumSet;
use crate::catalog::identity::{KeyValueShape, OperationName, SectionName, ValueType};
use crate::catalog::model::RequestDefaults;
use std::sync::Arc;

#[derive(Clone, Debug)]
/// How a logical parameter expands into wire parameters.
pub enum ParameterShape {
    /// One value at `wire_name`.
    Scalar,
    /// Ordered scalars at `wire_name.<i>` (1-based).
    List,
    /// Mapping flattened per the declared sub-shape.
    KeyValue(KeyValueShape),
    /// A single composite object; each field lands at `wire_name.<field>`.
    Struct(Vec<ParameterDescriptor>),
}

#[derive(Clone, Debug)]
/// One declarative parameter of an operation.
pub struct ParameterDescriptor {
    pub(crate) logical_name: String,
    pub(crate) wire_name: String,
    pub(crate) required: bool,
    pub(crate) shape: ParameterShape,
    pub(crate) enum_ref: Option<Arc<EnumSet>>,
    pub(crate) value_type: ValueType,
}

impl ParameterDescriptor {
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Dot-delimited wire path; defaults to the logical name.
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn shape(&self) -> &ParameterShape {
        &self.shape
    }

    pub fn enum_ref(&self) -> Option<&Arc<EnumSet>> {
        self.enum_ref.as_ref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// True when the wire name hard-codes a numeric index segment, the
    /// catalog's stand-in for a list of composite objects.
    pub fn has_fixed_index(&self) -> bool {
        self.wire_name
            .split('.')
            .any(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
    }
}

#[derive(Clone, Debug)]
/// A named remote operation with its effective request defaults.
pub struct OperationDescriptor {
    pub(crate) section: SectionName,
    pub(crate) name: OperationName,
    pub(crate) defaults: RequestDefaults,
    pub(crate) parameters: Vec<ParameterDescriptor>,
    pub(crate) response_path: Option<String>,
    pub(crate) limitation: Option<String>,
}

impl OperationDescriptor {
    pub fn section(&self) -> &SectionName {
        &self.section
    }

    pub fn name(&self) -> &OperationName {
        &self.name
    }

    /// Section defaults with any per-operation overrides applied.
    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn parameter(&self, logical_name: &str) -> Option<&ParameterDescriptor> {
        self.parameters
            .iter()
            .find(|param| param.logical_name == logical_name)
    }

    pub fn response_path(&self) -> Option<&str> {
        self.response_path.as_deref()
    }

    /// The response extraction path as a JSON pointer
    /// (`A.B.C` becomes `/A/B/C`).
    pub fn response_pointer(&self) -> Option<String> {
        let path = self.response_path.as_deref()?;
        let mut pointer = String::with_capacity(path.len() + 1);
        for segment in path.split('.') {
            pointer.push('/');
            pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        }
        Some(pointer)
    }

    pub fn limitation(&self) -> Option<&str> {
        self.limitation.as_deref()
    }

    /// Top-level and nested parameters whose wire names carry a literal index.
    pub fn fixed_index_parameters(&self) -> Vec<&ParameterDescriptor> {
        let mut acc = Vec::new();
        collect_fixed_index(&self.parameters, &mut acc);
        acc
    }
}

fn collect_fixed_index<'a>(
    params: &'a [ParameterDescriptor],
    acc: &mut Vec<&'a ParameterDescriptor>,
) {
    for param in params {
        if param.has_fixed_index() {
            acc.push(param);
        }
        if let ParameterShape::Struct(fields) = &param.shape {
            collect_fixed_index(fields, acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(name: &str, wire: &str) -> ParameterDescriptor {
        ParameterDescriptor {
            logical_name: name.to_string(),
            wire_name: wire.to_string(),
            required: true,
            shape: ParameterShape::Scalar,
            enum_ref: None,
            value_type: ValueType::String,
        }
    }

    fn operation(
        params: Vec<ParameterDescriptor>,
        response_path: Option<&str>,
    ) -> OperationDescriptor {
        OperationDescriptor {
            section: SectionName::from("Products"),
            name: OperationName::from("GetMyFeesEstimate"),
            defaults: RequestDefaults {
                name: "Products".into(),
                group: "Products".into(),
                path: "/Products/2011-10-01".into(),
                version: "2011-10-01".into(),
            },
            parameters: params,
            response_path: response_path.map(str::to_string),
            limitation: None,
        }
    }

    #[test]
    fn detects_literal_index_segments() {
        assert!(
            scalar("IdType", "FeesEstimateRequestList.FeesEstimateRequest.1.IdType")
                .has_fixed_index()
        );
        assert!(!scalar("ASINList", "ASINList.ASIN").has_fixed_index());
        assert!(!scalar("Version2", "Version2").has_fixed_index());
    }

    #[test]
    fn response_pointer_follows_dot_path() {
        let op = operation(
            Vec::new(),
            Some("FeesEstimateResultList.FeesEstimateResult.FeesEstimate"),
        );
        assert_eq!(
            op.response_pointer().as_deref(),
            Some("/FeesEstimateResultList/FeesEstimateResult/FeesEstimate")
        );
        assert!(operation(Vec::new(), None).response_pointer().is_none());
    }

    #[test]
    fn fixed_index_scan_descends_into_struct_fields() {
        let nested = ParameterDescriptor {
            logical_name: "Wrapper".into(),
            wire_name: "Wrapper".into(),
            required: false,
            shape: ParameterShape::Struct(vec![scalar("Inner", "Entries.1.Inner")]),
            enum_ref: None,
            value_type: ValueType::String,
        };
        let op = operation(vec![scalar("MarketplaceId", "MarketplaceId"), nested], None);
        let fixed = op.fixed_index_parameters();
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].logical_name(), "Inner");
        assert!(op.parameter("Wrapper").is_some());
        assert!(op.parameter("Inner").is_none());
    }
}
