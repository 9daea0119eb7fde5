// Test-case data model: what the JSON document decodes into and what the
// template renders from. JSON payloads stay `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{Kind, TypeRegistry};

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub body: Option<JsonObject>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    pub status_code: String,
    #[serde(default)]
    pub body: Option<JsonObject>,
}

/// One entry of a function's `test-cases` list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestCase {
    pub case_descr: String,
    #[serde(default)]
    pub request: Request,
    pub response: Response,
}

impl Request {
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }
}

impl Response {
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }
}

/// A Go struct field assignment for one matched JSON key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAssignment {
    pub field_name: String,
    pub kind: Kind,
    pub value: Value,
    /// Go expression for `value`.
    pub value_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedTestCase {
    #[serde(flatten)]
    pub case: TestCase,
    pub request_type: Option<String>,
    pub response_type: Option<String>,
    pub request_fields: Vec<FieldAssignment>,
    pub response_fields: Vec<FieldAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTestSpec {
    pub func: String,
    #[serde(rename = "test-cases", default)]
    pub raw_cases: Vec<TestCase>,
    #[serde(skip_deserializing)]
    pub test_cases: Vec<EnhancedTestCase>,
}

/// Everything the template sees. Built once by the assembler.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSpec {
    pub package_name: String,
    pub function_specs: Vec<FunctionTestSpec>,
    pub request_types: Vec<String>,
    pub response_types: Vec<String>,
    pub struct_infos: TypeRegistry,
}

impl GenerationSpec {
    pub fn case_count(&self) -> usize {
        self.function_specs.iter().map(|f| f.test_cases.len()).sum()
    }
}
