//! Loading per-function test cases from JSON documents.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::jq_exec::JqError;
use crate::model::FunctionTestSpec;
use crate::path_de::{from_str_with_path, PathError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read test cases file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse test cases JSON {}: {source}", path.display())]
    Decode { path: PathBuf, source: PathError },
    #[error("failed to apply jq expression to {}: {source}", path.display())]
    Jq { path: PathBuf, source: JqError },
    #[error("invalid test cases pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },
    #[error("glob pattern matched no files: {0}")]
    NoMatch(String),
}

/// Load every document named by `patterns` (literal paths or glob patterns)
/// and concatenate their function specs in order. An empty result is not an
/// error here.
pub fn load_test_cases<S: AsRef<str>>(
    patterns: &[S],
    jq_expr: Option<&str>,
) -> Result<Vec<FunctionTestSpec>, LoadError> {
    let mut specs = Vec::new();
    for path in resolve_file_path_patterns(patterns)? {
        let loaded = load_file(&path, jq_expr)?;
        debug!(path = %path.display(), functions = loaded.len(), "loaded test cases");
        specs.extend(loaded);
    }
    Ok(specs)
}

pub fn load_file(path: &Path, jq_expr: Option<&str>) -> Result<Vec<FunctionTestSpec>, LoadError> {
    let source = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Read { path: path.to_path_buf(), source })?;
    let decode = |text: &str| {
        from_str_with_path::<Vec<FunctionTestSpec>>(text)
            .map_err(|source| LoadError::Decode { path: path.to_path_buf(), source })
    };
    let Some(jq_expr) = jq_expr else {
        return decode(&source);
    };

    let document = serde_json::from_str::<Value>(&source).map_err(|e| LoadError::Decode {
        path: path.to_path_buf(),
        source: PathError { path: ".".into(), message: e.to_string() },
    })?;
    let outputs = crate::jq_exec::run_jaq(jq_expr, &document)
        .map_err(|source| LoadError::Jq { path: path.to_path_buf(), source })?;
    let mut specs = Vec::new();
    for output in outputs {
        specs.extend(decode(&output)?);
    }
    Ok(specs)
}

fn resolve_file_path_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>, LoadError> {
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let entries = glob::glob(pattern).map_err(|e| LoadError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let mut matched = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| LoadError::Pattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            matched.push(path);
        }
        if matched.is_empty() {
            return Err(LoadError::NoMatch(pattern.to_string()));
        }
        matched.sort();
        out.extend(matched);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DOC: &str = r#"[
  {
    "func": "CreateUserHandler",
    "test-cases": [
      {
        "case_descr": "valid user creation",
        "request": {"method": "POST", "path": "/users", "body": {"name": "John", "email": "john@example.com"}},
        "response": {"status_code": "201", "body": {"message": "User created successfully"}}
      },
      {
        "case_descr": "health",
        "response": {"status_code": "http.StatusOK"}
      }
    ]
  }
]"#;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn decodes_function_specs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "cases.json", DOC);
        let specs = load_file(&path, None).unwrap();
        assert_eq!(specs.len(), 1);
        let cases = &specs[0].raw_cases;
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].request.method.as_deref(), Some("POST"));
        assert_eq!(cases[0].request.body.as_ref().unwrap()["name"], json!("John"));
        assert_eq!(cases[1].request, Default::default());
        assert_eq!(cases[1].response.status_code, "http.StatusOK");
        assert!(specs[0].test_cases.is_empty());
    }

    #[test]
    fn empty_document_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.json", "[]");
        assert!(load_test_cases(&[path.to_string_lossy()], None).unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.json", "[{\"func\": ");
        assert!(matches!(load_file(&path, None), Err(LoadError::Decode { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            load_file(Path::new("/no/such/cases.json"), None),
            Err(LoadError::Read { .. })
        ));
    }

    #[test]
    fn glob_patterns_concatenate_sorted_matches() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", r#"[{"func": "B", "test-cases": []}]"#);
        write(dir.path(), "a.json", r#"[{"func": "A", "test-cases": []}]"#);
        let pattern = format!("{}/*.json", dir.path().display());
        let specs = load_test_cases(&[pattern], None).unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.func.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn unmatched_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        assert!(matches!(load_test_cases(&[pattern], None), Err(LoadError::NoMatch(_))));
    }

    #[test]
    fn jq_expression_filters_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "cases.json",
            r#"[{"func": "A", "test-cases": []}, {"func": "B", "test-cases": []}]"#,
        );
        let specs = load_file(&path, Some(r#"map(select(.func != "A"))"#)).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].func, "B");
    }
}
