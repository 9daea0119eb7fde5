//! Generates Go `net/http/httptest` table tests for HTTP handlers from a Go
//! source file of request/response structs and a JSON document of test cases.

pub mod assemble;
pub mod cli;
pub mod config;
pub mod golang;
pub mod infer;
pub mod jq_exec;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod path_de;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod synth;
