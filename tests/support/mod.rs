#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use flatwire::{Args, OperationDescriptor, SectionRegistry, WireParameters, serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Built-in catalog, built once per test binary.
pub fn registry() -> &'static SectionRegistry {
    static REGISTRY: OnceLock<SectionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| SectionRegistry::builtin().expect("built-in catalog loads"))
}

pub fn operation(section: &str, name: &str) -> &'static OperationDescriptor {
    registry()
        .operation(section, name)
        .unwrap_or_else(|| panic!("operation {section}.{name} missing from catalog"))
}

pub fn serialize_ok(section: &str, name: &str, args: &Args) -> WireParameters {
    serialize(operation(section, name), args)
        .unwrap_or_else(|err| panic!("{section}.{name} rejected arguments: {err}"))
}

/// Wire parameters with the `Action`/`Version` envelope stripped.
pub fn body(params: &WireParameters) -> Vec<(String, String)> {
    params
        .to_pairs()
        .into_iter()
        .skip(2)
        .collect()
}

pub fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

pub fn write_section(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Minimal section document with one operation carrying `params_json`.
pub fn section_json(name: &str, operation: &str, params_json: &str) -> String {
    format!(
        r#"{{
  "schema_version": "flatwire_section_v1",
  "defaults": {{"name": "{name}", "group": "{name}",
                "path": "/{name}/2020-01-01", "version": "2020-01-01"}},
  "operations": [{{"name": "{operation}", "params": {params_json}}}]
}}"#
    )
}

pub fn wire_params_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wire-params"))
}

pub fn catalog_lint_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog-lint"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
