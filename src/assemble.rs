//! Turns raw test cases into the generation spec the template renders.

use tracing::debug;

use crate::infer::{infer_request_type, infer_response_type};
use crate::matcher::generate_field_assignments;
use crate::model::{
    EnhancedTestCase, FieldAssignment, FunctionTestSpec, GenerationSpec, JsonObject, TestCase,
};
use crate::schema::TypeRegistry;

/// Candidate struct names for request and response bodies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    pub request: Vec<String>,
    pub response: Vec<String>,
}

pub fn prepare_specs(
    package_name: String,
    mut specs: Vec<FunctionTestSpec>,
    candidates: Candidates,
    registry: TypeRegistry,
) -> GenerationSpec {
    for spec in &mut specs {
        spec.test_cases = spec
            .raw_cases
            .iter()
            .map(|case| enhance_case(case, &candidates, &registry))
            .collect();
        debug!(func = %spec.func, cases = spec.test_cases.len(), "prepared test cases");
    }

    GenerationSpec {
        package_name,
        function_specs: specs,
        request_types: candidates.request,
        response_types: candidates.response,
        struct_infos: registry,
    }
}

pub fn enhance_case(case: &TestCase, candidates: &Candidates, registry: &TypeRegistry) -> EnhancedTestCase {
    let request_type = infer_request_type(case, &candidates.request);
    let response_type = infer_response_type(case, &candidates.response);

    EnhancedTestCase {
        request_fields: assignments(request_type, case.request.body.as_ref(), registry),
        response_fields: assignments(response_type, case.response.body.as_ref(), registry),
        request_type: request_type.map(str::to_string),
        response_type: response_type.map(str::to_string),
        case: case.clone(),
    }
}

fn assignments(
    type_name: Option<&str>,
    body: Option<&JsonObject>,
    registry: &TypeRegistry,
) -> Vec<FieldAssignment> {
    match (type_name.and_then(|t| registry.get(t)), body) {
        (Some(schema), Some(body)) if !body.is_empty() => generate_field_assignments(body, schema),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::golang::parse_source;
    use crate::schema::extract;
    use pretty_assertions::assert_eq;

    const HANDLER: &str = r#"package handler

type (
	User struct {
		ID    int    `json:"id"`
		Name  string `json:"name"`
	}
	CreateUserRequest struct {
		Name  string `json:"name"`
		Email string `json:"email"`
	}
	CreateUserResponse struct {
		User   User   `json:"user"`
		Status string `json:"status"`
	}
	ErrorResponse struct {
		Error   string `json:"error"`
		Code    string `json:"code"`
	}
)
"#;

    const CASES: &str = r#"[{
  "func": "CreateUserHandler",
  "test-cases": [
    {
      "case_descr": "valid user",
      "request": {"method": "POST", "body": {"name": "John", "email": "j@x.io"}},
      "response": {"status_code": "201", "body": {"user": {"id": 1}, "status": "created"}}
    },
    {
      "case_descr": "missing email",
      "request": {"method": "POST", "body": {"name": "John"}},
      "response": {"status_code": "400", "body": {"error": "Invalid request", "code": "INVALID_INPUT"}}
    },
    {
      "case_descr": "no body",
      "request": {"method": "GET"},
      "response": {"status_code": "405"}
    }
  ]
}]"#;

    fn candidates() -> Candidates {
        Candidates {
            request: vec!["CreateUserRequest".into()],
            response: vec!["CreateUserResponse".into(), "ErrorResponse".into()],
        }
    }

    #[test]
    fn enhances_every_case_with_types_and_fields() {
        let source = extract(&parse_source(HANDLER).unwrap());
        let specs: Vec<FunctionTestSpec> = serde_json::from_str(CASES).unwrap();
        let spec = prepare_specs(source.package_name, specs, candidates(), source.registry);

        assert_eq!(spec.package_name, "handler");
        assert_eq!(spec.case_count(), 3);
        let cases = &spec.function_specs[0].test_cases;

        assert_eq!(cases[0].request_type.as_deref(), Some("CreateUserRequest"));
        assert_eq!(cases[0].response_type.as_deref(), Some("CreateUserResponse"));
        let codes: Vec<_> = cases[0].response_fields.iter().map(|f| f.value_code.as_str()).collect();
        assert_eq!(codes, [r#"User{Id: 1.000000}"#, r#""created""#]);

        assert_eq!(cases[1].response_type.as_deref(), Some("ErrorResponse"));
        assert_eq!(cases[1].request_fields.len(), 1);
        assert_eq!(cases[1].response_fields.len(), 2);

        assert_eq!(cases[2].request_type, None);
        assert_eq!(cases[2].response_type, None);
        assert!(cases[2].request_fields.is_empty());
        assert!(cases[2].response_fields.is_empty());
    }

    #[test]
    fn message_key_selects_the_error_candidate() {
        let source = extract(&parse_source(HANDLER).unwrap());
        let case: TestCase = serde_json::from_value(serde_json::json!({
            "case_descr": "conflict",
            "request": {"body": {"name": "John"}},
            "response": {"status_code": "409", "body": {"message": "already exists"}}
        }))
        .unwrap();
        let enhanced = enhance_case(&case, &candidates(), &source.registry);
        assert_eq!(enhanced.response_type.as_deref(), Some("ErrorResponse"));
        // ErrorResponse declares no `message` field
        assert!(enhanced.response_fields.is_empty());
    }

    #[test]
    fn unknown_candidate_types_resolve_without_assignments() {
        let case: TestCase = serde_json::from_value(serde_json::json!({
            "case_descr": "x",
            "request": {"body": {"name": "John"}},
            "response": {"status_code": "200"}
        }))
        .unwrap();
        let candidates = Candidates { request: vec!["Ghost".into()], response: vec![] };
        let enhanced = enhance_case(&case, &candidates, &TypeRegistry::new());
        assert_eq!(enhanced.request_type.as_deref(), Some("Ghost"));
        assert!(enhanced.request_fields.is_empty());
    }
}
