//! Operation catalog wiring.
//!
//! Sections are JSON documents under `catalog/` describing operations,
//! their parameters, enums, and default request scoping. This module loads
//! and validates them into immutable descriptors: `SectionRegistry` for
//! lookups by `(section, operation)`, `Section` for one resolved document.

pub mod descriptor;
pub mod enums;
pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use descriptor::{OperationDescriptor, ParameterDescriptor, ParameterShape};
pub use enums::{EnumRegistry, EnumSet};
pub use identity::{KeyValueShape, OperationName, SectionName, ValueType};
pub use index::Section;
pub use model::{
    DefaultsOverride, EnumRefDocument, OperationDocument, ParameterDocument, RequestDefaults,
    SECTION_SCHEMA_VERSION, SectionDocument, parse_section_document,
};
pub use repository::SectionRegistry;
