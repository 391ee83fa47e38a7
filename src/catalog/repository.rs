//! Holds every registered section for lookup by name.
//!
//! The registry is assembled once at startup (built-in sections plus any
//! directory named by `FLATWIRE_CATALOG_DIR`) and is read-only afterwards,
//! so `init` hands out a `&'static` reference that concurrent callers share
//! without locking.

use crate::catalog::descriptor::OperationDescriptor;
use crate::catalog::enums::{EnumRegistry, EnumSet};
use crate::catalog::identity::SectionName;
use crate::catalog::index::Section;
use crate::catalog::model::SectionDocument;
use crate::runtime;
use crate::schema_loader::SectionSchema;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Section documents compiled into the crate.
const BUILTIN_SECTIONS: &[(&str, &str)] = &[
    ("catalog/products.json", include_str!("../../catalog/products.json")),
    (
        "catalog/subscriptions.json",
        include_str!("../../catalog/subscriptions.json"),
    ),
];

static GLOBAL: OnceLock<SectionRegistry> = OnceLock::new();

#[derive(Debug, Default)]
/// In-memory store for resolved sections keyed by `SectionName`.
pub struct SectionRegistry {
    shared_enums: EnumRegistry,
    sections: BTreeMap<SectionName, Section>,
}

impl SectionRegistry {
    /// Registry holding only the sections shipped with the crate.
    pub fn builtin() -> Result<Self> {
        let schema = SectionSchema::compile()?;
        let mut registry = Self::default();
        for (label, raw) in BUILTIN_SECTIONS {
            registry
                .register_json(&schema, raw, label)
                .with_context(|| format!("registering built-in section {label}"))?;
        }
        Ok(registry)
    }

    /// Define an enum visible to every section registered afterwards.
    ///
    /// Section-local enums with the same name take precedence.
    pub fn define_enum<I, S>(&mut self, name: &str, values: I) -> Arc<EnumSet>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_enums.define(name, values)
    }

    pub fn shared_enums(&self) -> &EnumRegistry {
        &self.shared_enums
    }

    /// Resolve and register a section document.
    ///
    /// Dangling enum references and conflicting shapes fail here so a
    /// corrupt catalog never reaches request time. A section registered
    /// under an existing name replaces the earlier one.
    pub fn register_section(&mut self, document: SectionDocument) -> Result<&Section> {
        let section = Section::build(document, &self.shared_enums)?;
        let name = section.name().clone();
        tracing::info!(
            section = %name,
            operations = section.operations().len(),
            "registered section"
        );
        if self.sections.insert(name.clone(), section).is_some() {
            tracing::warn!(section = %name, "section redefined; last registration wins");
        }
        self.sections
            .get(&name)
            .with_context(|| format!("section {name} missing after registration"))
    }

    /// Validate raw JSON against the section schema, then register it.
    pub fn register_json(
        &mut self,
        schema: &SectionSchema,
        raw: &str,
        label: &str,
    ) -> Result<&Section> {
        let value: Value =
            serde_json::from_str(raw).with_context(|| format!("parsing section {label}"))?;
        schema.validate(&value, label)?;
        let document: SectionDocument = serde_json::from_value(value)
            .with_context(|| format!("decoding section {label}"))?;
        self.register_section(document)
    }

    /// Register every `*.json` section under `dir`, in file-name order.
    pub fn load_sections_from_dir(&mut self, dir: &Path) -> Result<usize> {
        let schema = SectionSchema::compile()?;
        let files = find_section_files(dir)?;
        if files.is_empty() {
            bail!("No section documents found under {}", dir.display());
        }
        for path in &files {
            self.register_file(&schema, path)?;
        }
        Ok(files.len())
    }

    /// Validate and register one section file.
    pub fn load_section_file(&mut self, path: &Path) -> Result<&Section> {
        let schema = SectionSchema::compile()?;
        self.register_file(&schema, path)
    }

    fn register_file(&mut self, schema: &SectionSchema, path: &Path) -> Result<&Section> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        self.register_json(schema, &raw, &path.display().to_string())
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(&SectionName::from(name))
    }

    /// Resolve an operation descriptor by `(section, operation)`.
    pub fn operation(&self, section: &str, operation: &str) -> Option<&OperationDescriptor> {
        self.section(section)?.operation(operation)
    }

    /// Sections in stable (name) order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }
}

/// Build the process-wide registry on first call and return it.
///
/// Loads the built-in sections, then any directory named by
/// `FLATWIRE_CATALOG_DIR`. Errors indicate a corrupt catalog and are meant
/// to abort startup.
pub fn init() -> Result<&'static SectionRegistry> {
    if let Some(registry) = GLOBAL.get() {
        return Ok(registry);
    }
    let mut registry = SectionRegistry::builtin()?;
    if let Some(dir) = runtime::catalog_dir_from_env() {
        registry
            .load_sections_from_dir(&dir)
            .with_context(|| format!("loading sections from {}", dir.display()))?;
    }
    // A concurrent initializer may have won; either result is equivalent.
    Ok(GLOBAL.get_or_init(|| registry))
}

/// The process-wide registry, if `init` has run.
pub fn global() -> Option<&'static SectionRegistry> {
    GLOBAL.get()
}

fn find_section_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Catalog directory not found: {}", dir.display());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_shipped_sections() {
        let registry = SectionRegistry::builtin().unwrap();
        let names: Vec<&str> = registry.sections().map(|s| s.name().0.as_str()).collect();
        assert_eq!(names, vec!["Products", "Subscriptions"]);
        assert!(registry.operation("Products", "GetMatchingProduct").is_some());
        assert!(registry.operation("Products", "Nope").is_none());
        assert!(registry.operation("Nope", "GetMatchingProduct").is_none());
    }

    #[test]
    fn shared_enums_resolve_for_later_sections() {
        let mut registry = SectionRegistry::default();
        registry.define_enum("Marketplaces", ["ATVPDKIKX0DER", "A2EUQ1WTGCTBG2"]);
        let doc: SectionDocument = serde_json::from_str(
            r#"{
                "schema_version": "flatwire_section_v1",
                "defaults": {"name": "Sellers", "group": "Sellers",
                             "path": "/Sellers/2011-07-01", "version": "2011-07-01"},
                "operations": [{"name": "ListMarketplaceParticipations",
                                "params": [{"name": "MarketplaceId", "enum": "Marketplaces"}]}]
            }"#,
        )
        .unwrap();
        let section = registry.register_section(doc).unwrap();
        let param = section
            .operation("ListMarketplaceParticipations")
            .unwrap()
            .parameter("MarketplaceId")
            .unwrap();
        assert!(param.enum_ref().unwrap().contains("A2EUQ1WTGCTBG2"));
    }

    #[test]
    fn schema_rejects_documents_before_registration() {
        let schema = SectionSchema::compile().unwrap();
        let mut registry = SectionRegistry::default();
        let err = registry
            .register_json(
                &schema,
                r#"{"schema_version": "flatwire_section_v1", "operations": []}"#,
                "inline",
            )
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed schema validation"));
        assert!(registry.section("inline").is_none());
    }

    #[test]
    fn section_files_pass_through_schema_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("sellers.json");
        fs::write(
            &good,
            r#"{"schema_version": "flatwire_section_v1",
                "defaults": {"name": "Sellers", "group": "Sellers",
                             "path": "/Sellers/2011-07-01", "version": "2011-07-01"},
                "operations": [{"name": "GetServiceStatus"}]}"#,
        )
        .unwrap();
        let mut registry = SectionRegistry::default();
        let section = registry.load_section_file(&good).unwrap();
        assert_eq!(section.operations().len(), 1);

        // Deserializes fine (unknown keys are ignored by serde) but the schema forbids it.
        let extra_key = dir.path().join("orders.json");
        fs::write(
            &extra_key,
            r#"{"schema_version": "flatwire_section_v1",
                "defaults": {"name": "Orders", "group": "Orders",
                             "path": "/Orders/2013-09-01", "version": "2013-09-01"},
                "operations": [{"name": "ListOrders", "paginate": true}]}"#,
        )
        .unwrap();
        let err = registry.load_section_file(&extra_key).unwrap_err();
        assert!(format!("{err:#}").contains("failed schema validation"), "{err:#}");
        assert!(registry.section("Orders").is_none());

        assert!(registry.load_section_file(&dir.path().join("missing.json")).is_err());
    }
}
