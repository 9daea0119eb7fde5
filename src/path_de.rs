use serde::de::DeserializeOwned;

/// A decode failure located at a JSON path, e.g. `[0].test-cases[2].response`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(PathError { path, message: err.into_inner().to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionTestSpec;

    #[test]
    fn reports_the_path_of_a_type_mismatch() {
        let src = r#"[{"func": "H", "test-cases": [{"case_descr": "ok", "response": {"status_code": 200}}]}]"#;
        let err = from_str_with_path::<Vec<FunctionTestSpec>>(src).unwrap_err();
        assert_eq!(err.path, "[0].test-cases[0].response.status_code");
    }
}
