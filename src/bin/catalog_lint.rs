//! Loads the operation catalog and reports what it contains.
//!
//! Registration performs every referential check (enum references, shape
//! conflicts, duplicate names), so a successful run means the catalog is
//! safe to serve. The summary also lists operations that hard-code a list
//! index in their wire names, since those only model the first entry of a
//! composite list on the remote side.

use anyhow::{Context, Result, anyhow, bail};
use flatwire::runtime::split_list;
use flatwire::{Section, SectionRegistry, logging};
use serde_json::{Value, json};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse()?;

    let mut registry = SectionRegistry::builtin()?;
    let catalog_dir = cli.catalog_dir.or_else(flatwire::runtime::catalog_dir_from_env);
    if let Some(dir) = &catalog_dir {
        let loaded = registry
            .load_sections_from_dir(dir)
            .with_context(|| format!("loading sections from {}", dir.display()))?;
        tracing::info!(files = loaded, dir = %dir.display(), "loaded extra sections");
    }

    let selected: Vec<&Section> = if cli.sections.is_empty() {
        registry.sections().collect()
    } else {
        cli.sections
            .iter()
            .map(|name| {
                registry
                    .section(name)
                    .ok_or_else(|| anyhow!("Unknown section: {name}"))
            })
            .collect::<Result<_>>()?
    };

    if cli.list {
        for section in selected {
            for op in section.operations() {
                println!("{}.{}", section.name(), op.name());
            }
        }
        return Ok(());
    }

    let summary: Vec<Value> = selected.into_iter().map(section_summary).collect();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn section_summary(section: &Section) -> Value {
    let fixed_index: Vec<Value> = section
        .operations()
        .iter()
        .filter_map(|op| {
            let params = op.fixed_index_parameters();
            if params.is_empty() {
                return None;
            }
            Some(json!({
                "operation": op.name(),
                "wire_names": params.iter().map(|p| p.wire_name()).collect::<Vec<_>>(),
                "limitation": op.limitation(),
            }))
        })
        .collect();

    json!({
        "section": section.name(),
        "defaults": section.defaults(),
        "operations": section.operations().len(),
        "enums": section.enums().iter().map(|e| e.name()).collect::<Vec<_>>(),
        "types": section.type_names().collect::<Vec<_>>(),
        "fixed_index_operations": fixed_index,
    })
}

struct CliArgs {
    catalog_dir: Option<PathBuf>,
    sections: Vec<String>,
    list: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut catalog_dir = None;
        let mut sections = Vec::new();
        let mut list = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--catalog-dir" => {
                    catalog_dir = Some(PathBuf::from(next_value(&mut args, "--catalog-dir")?))
                }
                "--sections" => sections.extend(split_list(&next_value(&mut args, "--sections")?)),
                "--list" => list = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        Ok(CliArgs {
            catalog_dir,
            sections,
            list,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: catalog-lint [--catalog-dir DIR] [--sections A,B] [--list]\n\
Loads and validates the section catalog, then prints a JSON summary per section\n\
(or Section.Operation lines with --list).\n"
}
