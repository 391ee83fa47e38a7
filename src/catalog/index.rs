//! Resolved view of one section document.
//!
//! Building a `Section` is where the catalog gets strict: the schema
//! version must match, names must be non-empty and unique, shape flags must
//! not conflict, and every named enum reference must resolve. A failure here
//! means the catalog itself is corrupt, so errors are fatal at load time
//! rather than surfacing per request.

use crate::catalog::descriptor::{OperationDescriptor, ParameterDescriptor, ParameterShape};
use crate::catalog::enums::{EnumRegistry, EnumSet};
use crate::catalog::identity::{OperationName, SectionName};
use crate::catalog::model::{
    EnumRefDocument, OperationDocument, ParameterDocument, RequestDefaults,
    SECTION_SCHEMA_VERSION, SectionDocument,
};
use anyhow::{Context, Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug)]
/// Section defaults, local enums and types, plus operations indexed by name.
pub struct Section {
    name: SectionName,
    defaults: RequestDefaults,
    enums: EnumRegistry,
    types: BTreeMap<String, BTreeMap<String, String>>,
    operations: Vec<OperationDescriptor>,
    by_name: BTreeMap<OperationName, usize>,
}

impl Section {
    /// Resolve a document against the registry-wide shared enums.
    pub(crate) fn build(document: SectionDocument, shared: &EnumRegistry) -> Result<Self> {
        validate_schema_version(&document.schema_version)?;
        validate_defaults(&document.defaults)?;
        let name = SectionName(document.defaults.name.clone());

        let mut enums = EnumRegistry::default();
        for (enum_name, values) in document.enums {
            if enum_name.trim().is_empty() {
                bail!("section {name} defines an enum with an empty name");
            }
            enums.define(&enum_name, values);
        }

        let mut operations = Vec::with_capacity(document.operations.len());
        let mut by_name = BTreeMap::new();
        for op in document.operations {
            if op.name.0.trim().is_empty() {
                bail!("section {name} contains an operation with no name");
            }
            if by_name.contains_key(&op.name) {
                bail!("section {name} declares operation {} more than once", op.name);
            }
            let descriptor = resolve_operation(&name, &document.defaults, op, &enums, shared)?;
            let fixed = descriptor.fixed_index_parameters();
            if !fixed.is_empty() {
                tracing::debug!(
                    section = %name,
                    operation = %descriptor.name,
                    params = ?fixed.iter().map(|p| p.wire_name()).collect::<Vec<_>>(),
                    "operation uses fixed-index wire names"
                );
            }
            by_name.insert(descriptor.name.clone(), operations.len());
            operations.push(descriptor);
        }

        Ok(Self {
            name,
            defaults: document.defaults,
            enums,
            types: document.types,
            operations,
            by_name,
        })
    }

    pub fn name(&self) -> &SectionName {
        &self.name
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Section-local enums.
    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    /// Resolve an operation by name.
    ///
    /// Returns `None` instead of erroring; callers decide how to report the
    /// unknown name.
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.by_name
            .get(&OperationName::from(name))
            .map(|idx| &self.operations[*idx])
    }

    /// Operations in declaration order.
    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Look up the description of a code in one of the section's types
    /// (e.g., `ServiceStatus` / `GREEN`).
    pub fn describe(&self, type_name: &str, code: &str) -> Option<&str> {
        self.types.get(type_name)?.get(code).map(String::as_str)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

fn validate_schema_version(schema_version: &str) -> Result<()> {
    if schema_version != SECTION_SCHEMA_VERSION {
        bail!(
            "schema_version '{}' not supported (expected {})",
            schema_version,
            SECTION_SCHEMA_VERSION
        );
    }
    Ok(())
}

fn validate_defaults(defaults: &RequestDefaults) -> Result<()> {
    for (field, value) in [
        ("name", &defaults.name),
        ("group", &defaults.group),
        ("path", &defaults.path),
        ("version", &defaults.version),
    ] {
        if value.trim().is_empty() {
            bail!("defaults.{field} must not be empty");
        }
    }
    if !defaults
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    {
        bail!(
            "defaults.name must match ^[A-Za-z0-9_-]+$, got {}",
            defaults.name
        );
    }
    Ok(())
}

fn resolve_operation(
    section: &SectionName,
    section_defaults: &RequestDefaults,
    op: OperationDocument,
    local: &EnumRegistry,
    shared: &EnumRegistry,
) -> Result<OperationDescriptor> {
    let mut defaults = section_defaults.clone();
    if let Some(overrides) = op.defaults {
        if let Some(group) = overrides.group {
            defaults.group = group;
        }
        if let Some(path) = overrides.path {
            defaults.path = path;
        }
        if let Some(version) = overrides.version {
            defaults.version = version;
        }
    }

    let label = format!("{section}.{}", op.name);
    let parameters = resolve_parameters(&label, &op.params, local, shared)
        .with_context(|| format!("resolving parameters of {label}"))?;

    if let Some(path) = &op.response_path {
        if path.split('.').any(str::is_empty) {
            bail!("{label} has malformed response_path '{path}'");
        }
    }

    Ok(OperationDescriptor {
        section: section.clone(),
        name: op.name,
        defaults,
        parameters,
        response_path: op.response_path,
        limitation: op.limitation,
    })
}

fn resolve_parameters(
    owner: &str,
    params: &[ParameterDocument],
    local: &EnumRegistry,
    shared: &EnumRegistry,
) -> Result<Vec<ParameterDescriptor>> {
    let mut seen = BTreeSet::new();
    let mut resolved = Vec::with_capacity(params.len());
    for param in params {
        if !seen.insert(param.name.as_str()) {
            bail!("{owner} declares parameter {} more than once", param.name);
        }
        resolved.push(resolve_parameter(owner, param, local, shared)?);
    }
    Ok(resolved)
}

fn resolve_parameter(
    owner: &str,
    param: &ParameterDocument,
    local: &EnumRegistry,
    shared: &EnumRegistry,
) -> Result<ParameterDescriptor> {
    let name = param.name.as_str();
    if name.trim().is_empty() {
        bail!("{owner} contains a parameter with no name");
    }
    if name.trim() != name {
        bail!("{owner} parameter '{name}' has leading or trailing whitespace");
    }
    let wire_name = match &param.wire_name {
        Some(wire) => wire.clone(),
        None => param.name.clone(),
    };
    if wire_name.split('.').any(str::is_empty) {
        bail!("{owner}.{name} has malformed wire name '{wire_name}'");
    }

    let shape = match (param.list, param.key_value, &param.fields) {
        (false, None, None) => ParameterShape::Scalar,
        (true, None, None) => ParameterShape::List,
        (false, Some(kv), None) => ParameterShape::KeyValue(kv),
        (false, None, Some(fields)) => {
            if fields.is_empty() {
                bail!("{owner}.{name} declares an empty field list");
            }
            let nested_owner = format!("{owner}.{name}");
            ParameterShape::Struct(resolve_parameters(&nested_owner, fields, local, shared)?)
        }
        (true, Some(_), _) => bail!("{owner}.{name} cannot be both a list and a key/value map"),
        (true, None, Some(_)) => bail!(
            "{owner}.{name}: lists of composite objects are not supported; \
             declare fixed-index scalar parameters instead"
        ),
        (false, Some(_), Some(_)) => {
            bail!("{owner}.{name} cannot be both a key/value map and a composite")
        }
    };

    let enum_ref = match &param.enum_ref {
        None => None,
        Some(_) if matches!(shape, ParameterShape::Struct(_)) => {
            bail!("{owner}.{name} is a composite and cannot reference an enum")
        }
        Some(EnumRefDocument::Named(enum_name)) => {
            let set = local
                .get(enum_name)
                .or_else(|| shared.get(enum_name))
                .with_context(|| format!("{owner}.{name} references unknown enum '{enum_name}'"))?;
            Some(Arc::clone(set))
        }
        Some(EnumRefDocument::Inline(values)) => Some(Arc::new(EnumSet::new(
            format!("{owner}.{name}"),
            values.iter().cloned(),
        ))),
    };

    Ok(ParameterDescriptor {
        logical_name: name.to_string(),
        wire_name,
        required: param.required,
        shape,
        enum_ref,
        value_type: param.value_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::identity::KeyValueShape;

    fn document(params: Vec<ParameterDocument>) -> SectionDocument {
        SectionDocument {
            schema_version: SECTION_SCHEMA_VERSION.to_string(),
            defaults: RequestDefaults {
                name: "Products".into(),
                group: "Products".into(),
                path: "/Products/2011-10-01".into(),
                version: "2011-10-01".into(),
            },
            enums: BTreeMap::from([(
                "ItemConditions".to_string(),
                vec!["New".to_string(), "Used".to_string()],
            )]),
            types: BTreeMap::new(),
            operations: vec![OperationDocument {
                name: OperationName::from("GetThing"),
                params,
                defaults: None,
                response_path: None,
                limitation: None,
            }],
        }
    }

    fn build(params: Vec<ParameterDocument>) -> Result<Section> {
        Section::build(document(params), &EnumRegistry::default())
    }

    #[test]
    fn wire_name_defaults_to_logical_name() {
        let section = build(vec![ParameterDocument::required("MarketplaceId")]).unwrap();
        let op = section.operation("GetThing").unwrap();
        assert_eq!(op.parameters()[0].wire_name(), "MarketplaceId");
        assert_eq!(op.defaults().version, "2011-10-01");
    }

    #[test]
    fn rejects_dangling_enum_reference() {
        let err = build(vec![ParameterDocument::optional("Condition").enum_named("Missing")])
            .unwrap_err();
        assert!(format!("{err:#}").contains("unknown enum 'Missing'"));
    }

    #[test]
    fn resolves_local_before_shared_enums() {
        let mut shared = EnumRegistry::default();
        shared.define("ItemConditions", ["Shared"]);
        shared.define("Marketplaces", ["ATVPDKIKX0DER"]);
        let section = Section::build(
            document(vec![
                ParameterDocument::optional("ItemCondition").enum_named("ItemConditions"),
                ParameterDocument::optional("MarketplaceId").enum_named("Marketplaces"),
            ]),
            &shared,
        )
        .unwrap();
        let op = section.operation("GetThing").unwrap();
        let condition = op.parameter("ItemCondition").unwrap().enum_ref().unwrap();
        assert!(condition.contains("New"));
        assert!(!condition.contains("Shared"));
        let market = op.parameter("MarketplaceId").unwrap().enum_ref().unwrap();
        assert!(market.contains("ATVPDKIKX0DER"));
    }

    #[test]
    fn rejects_conflicting_shapes() {
        let err = build(vec![
            ParameterDocument::optional("Both")
                .list()
                .key_value(KeyValueShape::Flat),
        ])
        .unwrap_err();
        assert!(format!("{err:#}").contains("both a list and a key/value map"));

        let err = build(vec![
            ParameterDocument::optional("Requests")
                .list()
                .fields(vec![ParameterDocument::required("IdType")]),
        ])
        .unwrap_err();
        assert!(format!("{err:#}").contains("lists of composite objects are not supported"));
    }

    #[test]
    fn rejects_parameter_names_with_surrounding_whitespace() {
        let err = build(vec![ParameterDocument::required(" ASIN ")]).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("leading or trailing whitespace"), "{message}");

        let err = build(vec![ParameterDocument::optional("Destination").fields(vec![
            ParameterDocument::optional("DeliveryChannel\t"),
        ])])
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Products.GetThing.Destination"), "{message}");

        assert!(build(vec![ParameterDocument::optional("  ")]).is_err());
    }

    #[test]
    fn rejects_duplicate_parameters_and_operations() {
        let err = build(vec![
            ParameterDocument::required("ASIN"),
            ParameterDocument::optional("ASIN"),
        ])
        .unwrap_err();
        assert!(format!("{err:#}").contains("declares parameter ASIN more than once"));

        let mut doc = document(Vec::new());
        doc.operations.push(doc.operations[0].clone());
        let err = Section::build(doc, &EnumRegistry::default()).unwrap_err();
        assert!(err.to_string().contains("declares operation GetThing more than once"));
    }

    #[test]
    fn operation_overrides_replace_only_named_fields() {
        let mut doc = document(Vec::new());
        doc.operations[0].defaults = Some(crate::catalog::model::DefaultsOverride {
            version: Some("2017-01-01".into()),
            ..Default::default()
        });
        let section = Section::build(doc, &EnumRegistry::default()).unwrap();
        let defaults = section.operation("GetThing").unwrap().defaults();
        assert_eq!(defaults.version, "2017-01-01");
        assert_eq!(defaults.path, "/Products/2011-10-01");
    }

    #[test]
    fn rejects_unknown_schema_version_and_malformed_wire_names() {
        let mut doc = document(Vec::new());
        doc.schema_version = "flatwire_section_v0".into();
        assert!(Section::build(doc, &EnumRegistry::default()).is_err());

        let err = build(vec![ParameterDocument::required("Bad").wire_name("A..B")]).unwrap_err();
        assert!(format!("{err:#}").contains("malformed wire name"));
    }
}
