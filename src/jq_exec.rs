//! jq pre-filtering of test-case documents (via jaq).
//!
//! A filter may yield several outputs per document; each is handed back as
//! JSON text so the loader can decode it with path context.
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JqError {
    #[error("jq parse error in `{filter}`: {detail}")]
    Parse { filter: String, detail: String },
    #[error("jq filter `{filter}` uses undefined {}", names.join(", "))]
    Undefined { filter: String, names: Vec<String> },
    #[error("jq runtime error: {0}")]
    Runtime(String),
}

pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<String>, JqError> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(|errs| JqError::Parse {
        filter: filter_src.to_string(),
        detail: parse_details(&errs),
    })?;
    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| JqError::Undefined {
            filter: filter_src.to_string(),
            names: undefined_names(&errs),
        })?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs: Result<Vec<String>, JqError> = filter
        .run((Ctx::new([], &inputs), Val::from(input.clone())))
        .map(|item| item.map(|v| v.to_string()).map_err(|e| JqError::Runtime(format!("{e:?}"))))
        .collect();
    outputs
}

fn parse_details(errs: &[(load::File<&str, ()>, load::Error<&str>)]) -> String {
    errs.iter().map(|(_, err)| format!("{err:?}")).collect::<Vec<_>>().join("; ")
}

fn undefined_names(errs: &[(load::File<&str, ()>, Vec<(&str, Undefined)>)]) -> Vec<String> {
    errs.iter()
        .flat_map(|(_, list)| list.iter().map(|(name, undef)| format!("`{name}` ({undef:?})")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_matching_functions() {
        let doc = json!([{"func": "A", "test-cases": []}, {"func": "B", "test-cases": []}]);
        let out = run_jaq(r#"map(select(.func == "B"))"#, &doc).unwrap();
        assert_eq!(out.len(), 1);
        let v: Value = serde_json::from_str(&out[0]).unwrap();
        assert_eq!(v, json!([{"func": "B", "test-cases": []}]));
    }

    #[test]
    fn every_output_is_returned() {
        let doc = json!({"suites": [[1], [2]]});
        assert_eq!(run_jaq(".suites[]", &doc).unwrap(), ["[1]", "[2]"]);
    }

    #[test]
    fn bad_filters_are_classified() {
        assert!(matches!(run_jaq("no_such_filter", &json!(null)), Err(JqError::Undefined { .. })));
        assert!(matches!(run_jaq(".[", &json!(null)), Err(JqError::Parse { .. })));
        assert!(matches!(run_jaq("error(\"boom\")", &json!(null)), Err(JqError::Runtime(_))));
    }
}
