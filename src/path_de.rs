use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schema::FunctionSpec;

/// A decode failure plus the JSON path of the node that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub json_path: String,
    pub message: String,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at JSON path {} → {}", self.json_path, self.message)
    }
}

impl std::error::Error for PathError {}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_path_error)
}

pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, PathError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(into_path_error)
}

/// A schema document is either a list of functions or a single function.
pub fn functions_from_value(value: Value) -> Result<Vec<FunctionSpec>, PathError> {
    match value {
        Value::Array(_) => from_value_with_path(value),
        other => from_value_with_path::<FunctionSpec>(other).map(|f| vec![f]),
    }
}

fn into_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> PathError {
    PathError {
        json_path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_names_the_failing_node() {
        let err = functions_from_value(json!([
            { "name": "ok", "parameters": { "a": { "type": "string" } } },
            { "name": "bad", "parameters": { "o": { "type": "object", "structure": {
                "inner": { "type": "enum", "enum": [] }
            } } } }
        ]))
        .unwrap_err();
        assert_eq!(err.json_path, "[1].parameters.o.structure.inner");
        assert!(err.message.contains("enum parameter has no values"), "{err}");
    }

    #[test]
    fn single_function_document() {
        let fs = functions_from_value(json!({ "name": "ping" })).unwrap();
        assert_eq!(fs.len(), 1);
        assert_eq!(fs[0].name(), "ping");
        assert!(fs[0].parameters().is_empty());
    }

    #[test]
    fn from_str_reports_unknown_type() {
        let err = from_str_with_path::<Vec<FunctionSpec>>(
            r#"[{"name": "f", "parameters": {"x": {"type": "date"}}}]"#,
        )
        .unwrap_err();
        assert_eq!(err.json_path, "[0].parameters.x.type");
    }
}
