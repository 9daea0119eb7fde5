//! Struct schemas extracted from Go type declarations.
//!
//! Every top-level type name is recorded; exported, non-generic struct
//! declarations additionally get a [`StructSchema`] describing their fields in
//! declaration order.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::golang::ast::OtherType;
use crate::golang::{self, FieldDecl, TypeExpr, TypeFold};

// ------------------------------- Types ----------------------------------- //

/// Coarse value category that picks a literal synthesis rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Int,
    Uint,
    Float,
    Bool,
    Struct,
    Slice,
    Pointer,
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: String,
    /// Declared type as written, e.g. `*User`, `[]string`, `time.Time`.
    pub type_spelling: String,
    pub kind: Kind,
    /// Key used to look the field up in JSON objects.
    pub json_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

/// Type name → schema, in declaration order.
pub type TypeRegistry = IndexMap<String, StructSchema>;

#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub package_name: String,
    /// Every declared type name, struct or not.
    pub declared_types: Vec<String>,
    pub registry: TypeRegistry,
}

impl SourceFile {
    pub fn declares(&self, name: &str) -> bool {
        self.declared_types.iter().any(|t| t == name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse {}:{source}", path.display())]
    Syntax { path: PathBuf, source: golang::SyntaxError },
}

// ----------------------------- Extraction -------------------------------- //

/// Read and parse a Go file, then build its registry.
pub fn parse_go_file(path: &Path) -> Result<SourceFile, ParseError> {
    let source = std::fs::read_to_string(path)
        .map_err(|source| ParseError::Read { path: path.to_path_buf(), source })?;
    let file = golang::parse_source(&source)
        .map_err(|source| ParseError::Syntax { path: path.to_path_buf(), source })?;
    let out = extract(&file);
    debug!(
        path = %path.display(),
        package = %out.package_name,
        declared = out.declared_types.len(),
        structs = out.registry.len(),
        "extracted struct schemas"
    );
    Ok(out)
}

pub fn extract(file: &golang::File) -> SourceFile {
    let mut declared_types = Vec::with_capacity(file.types.len());
    let mut registry = TypeRegistry::new();

    for spec in &file.types {
        declared_types.push(spec.name.clone());

        if !spec.is_exported() {
            continue;
        }
        let fields = match &spec.ty {
            TypeExpr::Struct(fields) => fields,
            TypeExpr::Other(OtherType::MalformedStruct(err)) => {
                warn!(type_name = %spec.name, error = %err, "skipping struct with a malformed field list");
                continue;
            }
            _ => continue,
        };
        if spec.generic {
            warn!(type_name = %spec.name, line = spec.pos.line, "skipping generic struct declaration");
            continue;
        }
        registry.insert(spec.name.clone(), struct_schema(&spec.name, fields));
    }

    SourceFile { package_name: file.package.clone(), declared_types, registry }
}

fn struct_schema(name: &str, decls: &[FieldDecl]) -> StructSchema {
    let mut fields = Vec::new();
    for decl in decls {
        let type_spelling = decl.ty.fold(&Spelling);
        let kind = decl.ty.fold(&KindOf);
        // embedded fields have no names and contribute nothing
        for field_name in &decl.names {
            let json_key = decl.tag.as_deref()
                .and_then(json_tag_name)
                .unwrap_or_else(|| field_name.to_lowercase());
            fields.push(FieldSchema {
                name: field_name.clone(),
                type_spelling: type_spelling.clone(),
                kind,
                json_key,
            });
        }
    }
    StructSchema { name: name.to_string(), fields }
}

// -------------------------------- Views ---------------------------------- //

/// Renders a type expression the way it is spelled in Go source.
pub struct Spelling;

/// Placeholder spelling for types we do not model.
pub const OPAQUE_SPELLING: &str = "any";

impl TypeFold for Spelling {
    type Out = String;
    fn ident(&self, name: &str) -> String { name.to_string() }
    fn selector(&self, package: &str, name: &str) -> String { format!("{package}.{name}") }
    fn pointer(&self, inner: String) -> String { format!("*{inner}") }
    fn sequence(&self, elem: String) -> String { format!("[]{elem}") }
    fn other(&self, _ty: &TypeExpr) -> String { OPAQUE_SPELLING.to_string() }
}

/// Classifies a type expression into a [`Kind`].
pub struct KindOf;

impl TypeFold for KindOf {
    type Out = Kind;
    fn ident(&self, name: &str) -> Kind {
        match name {
            "string" => Kind::String,
            "int" | "int8" | "int16" | "int32" | "int64" | "rune" => Kind::Int,
            "uint" | "uint8" | "uint16" | "uint32" | "uint64" | "uintptr" | "byte" => Kind::Uint,
            "float32" | "float64" => Kind::Float,
            "bool" => Kind::Bool,
            "any" => Kind::Opaque,
            _ => Kind::Struct,
        }
    }
    fn selector(&self, _package: &str, _name: &str) -> Kind { Kind::Opaque }
    fn pointer(&self, _inner: Kind) -> Kind { Kind::Pointer }
    fn sequence(&self, _elem: Kind) -> Kind { Kind::Slice }
    fn other(&self, _ty: &TypeExpr) -> Kind { Kind::Opaque }
}

// --------------------------------- Tags ---------------------------------- //

static JSON_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\s|")json:"((?:[^"\\]|\\.)*)""#).expect("valid json tag regex")
});

/// Primary value of the `json` key in a struct tag, without modifiers.
/// `None` when there is no json key or its name part is empty.
pub fn json_tag_name(tag: &str) -> Option<String> {
    let caps = JSON_TAG.captures(tag)?;
    let value = caps.get(1)?.as_str();
    let name = value.split(',').next().unwrap_or_default();
    if name.is_empty() { None } else { Some(name.to_string()) }
}

// --------------------------------- Tests --------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract_src(src: &str) -> SourceFile {
        extract(&golang::parse_source(src).unwrap())
    }

    #[test]
    fn tag_primary_value_wins_over_field_name() {
        assert_eq!(json_tag_name(r#"json:"user_id""#).as_deref(), Some("user_id"));
        assert_eq!(json_tag_name(r#"json:"details,omitempty""#).as_deref(), Some("details"));
        assert_eq!(json_tag_name(r#"db:"x" json:"email" validate:"required""#).as_deref(), Some("email"));
        assert_eq!(json_tag_name(r#"json:",omitempty""#), None);
        assert_eq!(json_tag_name(r#"xml:"name""#), None);
        assert_eq!(json_tag_name(r#"yaml:"x"json:"y""#).as_deref(), Some("y"));
        assert_eq!(json_tag_name(r#"myjson:"z""#), None);
        assert_eq!(json_tag_name(r#"myjson:"name""#), None);
    }

    #[test]
    fn fields_keep_declaration_order_keys_and_kinds() {
        let out = extract_src(r#"package handler

type ErrorResponse struct {
	Error   string `json:"error"`
	Code    string `json:"code"`
	Details string `json:"details,omitempty"`
	Retry   bool
	After   *int
	Tags    []string `json:"tags"`
	Ratio   float64 `json:",omitempty"`
	Count   uint16 `json:"count"`
	At      time.Time
	Extra   map[string]any
}
"#);
        let schema = &out.registry["ErrorResponse"];
        let got: Vec<_> = schema.fields.iter()
            .map(|f| (f.name.as_str(), f.json_key.as_str(), f.kind, f.type_spelling.as_str()))
            .collect();
        assert_eq!(got, vec![
            ("Error", "error", Kind::String, "string"),
            ("Code", "code", Kind::String, "string"),
            ("Details", "details", Kind::String, "string"),
            ("Retry", "retry", Kind::Bool, "bool"),
            ("After", "after", Kind::Pointer, "*int"),
            ("Tags", "tags", Kind::Slice, "[]string"),
            ("Ratio", "ratio", Kind::Float, "float64"),
            ("Count", "count", Kind::Uint, "uint16"),
            ("At", "at", Kind::Opaque, "time.Time"),
            ("Extra", "extra", Kind::Opaque, "any"),
        ]);
    }

    #[test]
    fn non_struct_and_unexported_types_are_recorded_by_name_only() {
        let out = extract_src("package p\ntype Status string\ntype user struct { Name string }\ntype Page[T any] struct { Items []T }\ntype User struct { Name string }\n");
        assert_eq!(out.declared_types, vec!["Status", "user", "Page", "User"]);
        assert_eq!(out.registry.keys().collect::<Vec<_>>(), vec!["User"]);
        assert!(out.declares("Status"));
        assert!(!out.declares("Missing"));
    }

    #[test]
    fn malformed_structs_are_skipped() {
        let out = extract_src("package p\ntype Broken struct {\n A int int\n}\ntype Fine struct { B int }\n");
        assert_eq!(out.declared_types, vec!["Broken", "Fine"]);
        assert_eq!(out.registry.keys().collect::<Vec<_>>(), vec!["Fine"]);
    }

    #[test]
    fn multi_name_fields_share_a_type_and_embedded_fields_are_skipped() {
        let out = extract_src("package p\ntype Point struct {\n Base\n X, Y int `json:\"v\"`\n}\n");
        let fields = &out.registry["Point"].fields;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "X");
        assert_eq!(fields[1].name, "Y");
        assert_eq!(fields[1].json_key, "v");
    }

    #[test]
    fn named_types_and_nested_sequences_fold_independently() {
        let ty = TypeExpr::Sequence(Box::new(TypeExpr::Pointer(Box::new(TypeExpr::Selector {
            package: "models".into(),
            name: "User".into(),
        }))));
        assert_eq!(ty.fold(&Spelling), "[]*models.User");
        assert_eq!(ty.fold(&KindOf), Kind::Slice);
        assert_eq!(TypeExpr::Ident("Address".into()).fold(&KindOf), Kind::Struct);
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let err = parse_go_file(Path::new("/definitely/not/here.go")).unwrap_err();
        assert!(matches!(err, ParseError::Read { .. }));
    }
}
