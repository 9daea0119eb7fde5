use crate::model::{FieldAssignment, JsonObject};
use crate::schema::StructSchema;
use crate::synth::synthesize;

/// Assign JSON values to the fields of `schema`, in schema order.
///
/// A field is looked up by its json key, then its lowercase name, then its
/// exact name. Fields missing from `data` produce no assignment.
pub fn generate_field_assignments(data: &JsonObject, schema: &StructSchema) -> Vec<FieldAssignment> {
    schema
        .fields
        .iter()
        .filter_map(|field| {
            let value = data
                .get(&field.json_key)
                .or_else(|| data.get(&field.name.to_lowercase()))
                .or_else(|| data.get(&field.name))?;
            Some(FieldAssignment {
                field_name: field.name.clone(),
                kind: field.kind,
                value: value.clone(),
                value_code: synthesize(value, field.kind, &field.type_spelling),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, Kind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn field(name: &str, kind: Kind, spelling: &str, key: &str) -> FieldSchema {
        FieldSchema {
            name: name.into(),
            type_spelling: spelling.into(),
            kind,
            json_key: key.into(),
        }
    }

    fn object(v: serde_json::Value) -> JsonObject {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn assignments_follow_schema_order_not_json_order() {
        let schema = StructSchema {
            name: "CreateUserRequest".into(),
            fields: vec![
                field("Name", Kind::String, "string", "name"),
                field("Email", Kind::String, "string", "email"),
            ],
        };
        let data = object(json!({"email": "j@example.com", "name": "John"}));
        let got = generate_field_assignments(&data, &schema);
        let names: Vec<_> = got.iter().map(|a| a.field_name.as_str()).collect();
        assert_eq!(names, ["Name", "Email"]);
        assert_eq!(got[0].value_code, r#""John""#);
        assert_eq!(got[1].value, json!("j@example.com"));
    }

    #[test]
    fn missing_fields_produce_no_assignment() {
        let schema = StructSchema {
            name: "ErrorResponse".into(),
            fields: vec![
                field("Error", Kind::String, "string", "error"),
                field("Details", Kind::String, "string", "details"),
            ],
        };
        let got = generate_field_assignments(&object(json!({"error": "bad"})), &schema);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].field_name, "Error");
    }

    #[test]
    fn lookup_priority_is_key_then_lowercase_then_exact() {
        let schema = StructSchema {
            name: "T".into(),
            fields: vec![
                field("UserID", Kind::Int, "int", "user_id"),
                field("Age", Kind::Int, "int", "years"),
                field("Zip", Kind::String, "string", "postal"),
            ],
        };
        let data = object(json!({
            "user_id": 1, "userid": 2, "UserID": 3,
            "age": 40, "Age": 41,
            "Zip": "00100"
        }));
        let got = generate_field_assignments(&data, &schema);
        let codes: Vec<_> = got.iter().map(|a| a.value_code.as_str()).collect();
        assert_eq!(codes, ["1", "40", r#""00100""#]);
    }

    #[test]
    fn declared_kind_drives_synthesis() {
        let schema = StructSchema {
            name: "Person".into(),
            fields: vec![
                field("Age", Kind::Int, "int", "age"),
                field("Home", Kind::Struct, "Address", "home"),
                field("Tags", Kind::Slice, "[]string", "tags"),
            ],
        };
        let got = generate_field_assignments(&object(json!({"age": 42.0, "home": {"city": "Rome"}, "tags": []})), &schema);
        assert_eq!(got[0].value_code, "42");
        assert_eq!(got[0].kind, Kind::Int);
        assert_eq!(got[1].value_code, r#"Address{City: "Rome"}"#);
        assert_eq!(got[2].value_code, "nil");

        let got = generate_field_assignments(&object(json!({"age": "42"})), &schema);
        assert_eq!(got[0].value_code, "42");
    }
}
