//! Minimal CLI: generate (Go tests) | schema (debug view of the extracted structs)
use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, Subcommand, Args};

use crate::config::{parse_type_list, Config, UnknownTypePolicy};
use crate::pipeline::Summary;
use crate::render::Template;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Go HTTP handler tests from struct declarations and JSON test cases
#[derive(Parser, Debug)]
#[command(name = "testgen")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate a Go test file
    Generate(GenerateOut),
    /// parse the Go file and print the extracted struct schemas
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct TypeSettings {
    /// comma-separated candidate request struct names (e.g. CreateUserRequest,UpdateUserRequest)
    #[arg(long)]
    request_type: Option<String>,

    /// comma-separated candidate response struct names
    #[arg(long)]
    response_type: Option<String>,

    /// fail instead of warning when a candidate type is not declared in the input file
    #[arg(long, default_value_t = false)]
    strict_types: bool,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    /// Go source file declaring the request/response structs
    #[arg(short, long)]
    input: PathBuf,

    /// output Go test file
    #[arg(short, long)]
    output: PathBuf,

    /// One or more test case files. May be literal paths or quoted glob patterns
    #[arg(short = 't', long = "testcases", num_args = 1.., required = true)]
    test_cases: Vec<String>,

    #[command(flatten)]
    type_settings: TypeSettings,

    /// template file (the built-in Go template if omitted)
    #[arg(long)]
    template: Option<PathBuf>,

    /// JQ pre-process filter for each test case document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    /// Go source file
    #[arg(short, long)]
    input: PathBuf,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// What the binary reports after a command finishes.
#[derive(Debug)]
pub enum Outcome {
    Generated(Summary),
    Printed,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl GenerateOut {
    fn to_config(&self) -> Config {
        let unknown_types = if self.type_settings.strict_types {
            UnknownTypePolicy::Fail
        } else {
            UnknownTypePolicy::Warn
        };
        Config {
            input_file: self.input.clone(),
            output_file: self.output.clone(),
            test_cases: self.test_cases.clone(),
            request_types: type_list(self.type_settings.request_type.as_deref()),
            response_types: type_list(self.type_settings.response_type.as_deref()),
            template: self.template.clone(),
            jq_expr: self.jq_expr.clone(),
            unknown_types,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<Outcome> {
        match &self.cmd {
            Command::Generate(target) => {
                let config = target.to_config();

                // debug path
                if target.no_op {
                    eprintln!("{}", serde_json::to_string_pretty(&config)?);
                    return Ok(Outcome::Printed)
                }

                let template = match config.template.as_ref() {
                    Some(path) => Template::from_file(path)?,
                    None => Template::builtin(),
                };
                let summary = crate::pipeline::run(&config, &template)?;
                Ok(Outcome::Generated(summary))
            }
            Command::Schema(target) => {
                let source = crate::schema::parse_go_file(&target.input)?;
                let schema_src = serde_json::to_string_pretty(&source)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("could not create {}", parent.display()))?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("could not write {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
                Ok(Outcome::Printed)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn type_list(raw: Option<&str>) -> Vec<String> {
    raw.map(parse_type_list).unwrap_or_default()
}
