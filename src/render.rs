//! Renders a [`GenerationSpec`] through a minijinja template.
//!
//! Helpers available to templates:
//! - `has_body(body)`, `has_request_fields(fields)`, `has_response_fields(fields)`
//!   and `has_response_type(name)` predicates
//! - `json_marshal(value)`: compact JSON, key order preserved
//! - `go_json` filter: compact JSON as a Go string literal
//! - `sanitize_name` filter: spaces, `-` and `.` become `_` (sub-test names)

use std::borrow::Cow;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind, Value};
use tracing::debug;

use crate::model::GenerationSpec;
use crate::synth::go_string_literal;

const BUILTIN_NAME: &str = "handler_test.go.jinja";
const BUILTIN_SOURCE: &str = include_str!("../templates/handler_test.go.jinja");

/// Template text plus a name used in error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub source: Cow<'static, str>,
}

impl Template {
    /// The Go `net/http/httptest` template shipped with the crate.
    pub fn builtin() -> Self {
        Self { name: BUILTIN_NAME.to_string(), source: Cow::Borrowed(BUILTIN_SOURCE) }
    }

    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { name: name.into(), source: Cow::Owned(source.into()) }
    }

    pub fn from_file(path: &Path) -> Result<Self, WriteError> {
        let source = std::fs::read_to_string(path)
            .map_err(|source| WriteError::ReadTemplate { path: path.to_path_buf(), source })?;
        Ok(Self::from_source(path.display().to_string(), source))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("could not read template {}: {source}", path.display())]
    ReadTemplate { path: PathBuf, source: std::io::Error },
    #[error("could not parse template {name}: {source}")]
    Parse { name: String, source: minijinja::Error },
    #[error("could not execute template {name}: {source}")]
    Execute { name: String, source: minijinja::Error },
    #[error("could not create {}: {source}", path.display())]
    Create { path: PathBuf, source: std::io::Error },
    #[error("could not write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
}

/// Render `spec` and write the result to `output`, replacing any existing file.
pub fn generate_tests(spec: &GenerationSpec, template: &Template, output: &Path) -> Result<(), WriteError> {
    let rendered = render_to_string(spec, template)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|source| WriteError::Create { path: parent.to_path_buf(), source })?;
    }
    let mut file = std::fs::File::create(output)
        .map_err(|source| WriteError::Create { path: output.to_path_buf(), source })?;
    file.write_all(rendered.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| WriteError::Write { path: output.to_path_buf(), source })?;

    debug!(output = %output.display(), bytes = rendered.len(), "wrote generated tests");
    Ok(())
}

pub fn render_to_string(spec: &GenerationSpec, template: &Template) -> Result<String, WriteError> {
    let env = environment();
    let tmpl = env.template_from_str(&template.source).map_err(|source| WriteError::Parse {
        name: template.name.clone(),
        source,
    })?;
    tmpl.render(spec).map_err(|source| WriteError::Execute { name: template.name.clone(), source })
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);

    env.add_function("has_body", is_populated);
    env.add_function("has_request_fields", is_populated);
    env.add_function("has_response_fields", is_populated);
    env.add_function("has_response_type", |name: Value| name.is_true());
    env.add_function("json_marshal", json_marshal);
    env.add_filter("sanitize_name", sanitize_name);
    env.add_filter("go_json", go_json);
    env
}

fn is_populated(value: Value) -> bool {
    value.len().is_some_and(|n| n > 0)
}

fn json_marshal(value: Value) -> Result<String, minijinja::Error> {
    serde_json::to_string(&value).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, "value is not JSON serializable").with_source(e)
    })
}

fn go_json(value: Value) -> Result<String, minijinja::Error> {
    json_marshal(value).map(|json| go_string_literal(&json))
}

/// Turn a case description into a sub-test identifier.
pub fn sanitize_name(name: String) -> String {
    name.replace([' ', '-', '.'], "_")
}
