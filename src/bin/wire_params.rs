//! Serializes one operation's arguments into wire parameters.
//!
//! Looks up `--section`/`--operation` in the catalog (built-ins plus any
//! `--catalog-dir` or `FLATWIRE_CATALOG_DIR` sections), reads the argument
//! object from a flag, a file, or stdin, and prints the flattened
//! parameters to stdout. Validation failures print a JSON report and exit 2
//! so scripts can tell bad input apart from a broken catalog (exit 1).

use anyhow::{Context, Result, anyhow, bail};
use flatwire::{Args, SectionRegistry, WireParameters, logging, parse_args_json, serialize};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

const EXIT_INVALID_ARGS: i32 = 2;

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = CliArgs::parse()?;

    let owned;
    let registry: &SectionRegistry = match &cli.catalog_dir {
        Some(dir) => {
            let mut registry = SectionRegistry::builtin()?;
            registry
                .load_sections_from_dir(dir)
                .with_context(|| format!("loading sections from {}", dir.display()))?;
            owned = registry;
            &owned
        }
        None => flatwire::init()?,
    };

    let operation = registry
        .operation(&cli.section, &cli.operation)
        .ok_or_else(|| {
            anyhow!(
                "Unknown operation {}.{}. Run 'catalog-lint --list' to see the catalog.",
                cli.section,
                cli.operation
            )
        })?;

    let args = cli.source.read_args()?;
    match serialize(operation, &args) {
        Ok(params) => {
            print_params(&params, cli.format)?;
            Ok(0)
        }
        Err(err) => {
            println!("{}", serde_json::to_string(&err.to_json())?);
            Ok(EXIT_INVALID_ARGS)
        }
    }
}

fn print_params(params: &WireParameters, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(params)?),
        OutputFormat::Object => println!("{}", serde_json::to_string(&params.to_json_object())?),
        OutputFormat::Lines => {
            for param in params {
                println!("{}={}", param.name, param.value);
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum OutputFormat {
    Json,
    Object,
    Lines,
}

impl OutputFormat {
    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "json" => Ok(Self::Json),
            "object" => Ok(Self::Object),
            "lines" => Ok(Self::Lines),
            other => bail!("unknown format '{other}' (expected json|object|lines)"),
        }
    }
}

enum ArgsSource {
    Inline(String),
    File(PathBuf),
    Stdin,
    Empty,
}

impl ArgsSource {
    fn read_args(&self) -> Result<Args> {
        let raw = match self {
            ArgsSource::Inline(raw) => raw.clone(),
            ArgsSource::File(path) => {
                if !path.is_file() {
                    bail!("Arguments file not found: {}", path.display());
                }
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
            }
            ArgsSource::Stdin => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading stdin")?;
                buf
            }
            ArgsSource::Empty => return Ok(Args::new()),
        };
        parse_args_json(&raw)
    }
}

struct CliArgs {
    section: String,
    operation: String,
    source: ArgsSource,
    catalog_dir: Option<PathBuf>,
    format: OutputFormat,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut section: Option<String> = None;
        let mut operation: Option<String> = None;
        let mut source: Option<ArgsSource> = None;
        let mut catalog_dir: Option<PathBuf> = None;
        let mut format = OutputFormat::Json;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--section" => section = Some(next_value(&mut args, "--section")?),
                "--operation" => operation = Some(next_value(&mut args, "--operation")?),
                "--args" => {
                    let raw = next_value(&mut args, "--args")?;
                    set_source(&mut source, ArgsSource::Inline(raw))?;
                }
                "--args-file" => {
                    let path = PathBuf::from(next_value(&mut args, "--args-file")?);
                    set_source(&mut source, ArgsSource::File(path))?;
                }
                "--stdin" => set_source(&mut source, ArgsSource::Stdin)?,
                "--catalog-dir" => {
                    catalog_dir = Some(PathBuf::from(next_value(&mut args, "--catalog-dir")?))
                }
                "--format" => {
                    format = OutputFormat::from_str(&next_value(&mut args, "--format")?)?
                }
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        Ok(CliArgs {
            section: section.ok_or_else(|| anyhow!("Missing required flag: --section"))?,
            operation: operation.ok_or_else(|| anyhow!("Missing required flag: --operation"))?,
            source: source.unwrap_or(ArgsSource::Empty),
            catalog_dir,
            format,
        })
    }
}

fn set_source(slot: &mut Option<ArgsSource>, source: ArgsSource) -> Result<()> {
    if slot.is_some() {
        bail!("--args/--args-file/--stdin may only be provided once");
    }
    *slot = Some(source);
    Ok(())
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
    "Usage: wire-params --section NAME --operation NAME\n\
       [--args JSON|--args-file PATH|--stdin] [--catalog-dir DIR]\n\
       [--format json|object|lines]\n\
Validates the argument object against the operation and prints its flattened wire parameters.\n\
Exit status: 0 on success, 2 when the arguments are rejected, 1 on any other failure.\n"
}
