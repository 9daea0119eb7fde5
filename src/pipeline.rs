//! Extract → Load → Assemble → Render, as one linear pass.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::assemble::{prepare_specs, Candidates};
use crate::config::{Config, ConfigError, UnknownTypePolicy};
use crate::loader::{load_test_cases, LoadError};
use crate::render::{generate_tests, Template, WriteError};
use crate::schema::{parse_go_file, ParseError, SourceFile};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("no test cases found in {0}")]
    NoTestCases(String),
    #[error("type {0:?} is not declared in the input file")]
    UnknownType(String),
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub functions: usize,
    pub cases: usize,
    pub output: PathBuf,
}

pub fn run(config: &Config, template: &Template) -> Result<Summary, Error> {
    config.validate()?;

    let source = parse_go_file(&config.input_file)?;
    let candidates = Candidates {
        request: check_candidates(&source, &config.request_types, config.unknown_types)?,
        response: check_candidates(&source, &config.response_types, config.unknown_types)?,
    };

    let specs = load_test_cases(&config.test_cases, config.jq_expr.as_deref())?;
    if specs.is_empty() {
        return Err(Error::NoTestCases(config.test_cases.join(", ")));
    }
    debug!(functions = specs.len(), "loaded function specs");

    let spec = prepare_specs(source.package_name, specs, candidates, source.registry);
    generate_tests(&spec, template, &config.output_file)?;

    let summary = Summary {
        functions: spec.function_specs.len(),
        cases: spec.case_count(),
        output: config.output_file.clone(),
    };
    info!(
        functions = summary.functions,
        cases = summary.cases,
        output = %summary.output.display(),
        "generated tests"
    );
    Ok(summary)
}

/// Apply `policy` to candidate names the source file never declares.
fn check_candidates(
    source: &SourceFile,
    names: &[String],
    policy: UnknownTypePolicy,
) -> Result<Vec<String>, Error> {
    let mut kept = Vec::with_capacity(names.len());
    for name in names {
        if source.declares(name) {
            kept.push(name.clone());
            continue;
        }
        match policy {
            UnknownTypePolicy::Fail => return Err(Error::UnknownType(name.clone())),
            UnknownTypePolicy::Warn => {
                warn!(type_name = %name, "candidate type is not declared in the input file, ignoring it");
            }
        }
    }
    Ok(kept)
}
