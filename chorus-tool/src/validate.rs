//! Tool-call argument validation against a [`chorus_core::Tool`]'s declared
//! [`chorus_core::Parameter`]s (spec §4.3).

use chorus_core::{CoreError, Parameter, ParameterType};
use serde_json::Value;

/// Validate a tool-call's `arguments_json` against `parameters`.
///
/// Checks that `arguments_json` parses as a JSON object, that every `required`
/// parameter is present, and that every present parameter's value matches its
/// declared type. Unknown keys are tolerated — providers sometimes echo extra
/// fields, and rejecting on that basis would be far stricter than anything in
/// the spec's §4.3 contract.
pub fn validate_arguments(arguments_json: &str, parameters: &[Parameter]) -> Result<(), CoreError> {
    let value: Value = serde_json::from_str(arguments_json)
        .map_err(|e| CoreError::ToolArgumentError(format!("arguments are not valid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| CoreError::ToolArgumentError("arguments must be a JSON object".into()))?;

    for parameter in parameters {
        match object.get(&parameter.name) {
            Some(field_value) => {
                if !json_type_matches(field_value, parameter.param_type) {
                    return Err(CoreError::ToolArgumentError(format!(
                        "parameter '{}' must be {}, got {}",
                        parameter.name,
                        json_type_name(parameter.param_type),
                        describe_json_type(field_value),
                    )));
                }
                if let Some(allowed) = &parameter.r#enum {
                    let matches_enum = field_value
                        .as_str()
                        .map(|s| allowed.iter().any(|a| a == s))
                        .unwrap_or(false);
                    if !matches_enum {
                        return Err(CoreError::ToolArgumentError(format!(
                            "parameter '{}' must be one of {allowed:?}",
                            parameter.name
                        )));
                    }
                }
            }
            None if parameter.required => {
                return Err(CoreError::ToolArgumentError(format!(
                    "missing required parameter '{}'",
                    parameter.name
                )));
            }
            None => {}
        }
    }
    Ok(())
}

fn json_type_matches(value: &Value, expected: ParameterType) -> bool {
    match expected {
        ParameterType::String => value.is_string(),
        ParameterType::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
        ParameterType::Number => value.is_number(),
        ParameterType::Boolean => value.is_boolean(),
        ParameterType::Array => value.is_array(),
        ParameterType::Object => value.is_object(),
    }
}

fn json_type_name(param_type: ParameterType) -> &'static str {
    match param_type {
        ParameterType::String => "a string",
        ParameterType::Integer => "an integer",
        ParameterType::Number => "a number",
        ParameterType::Boolean => "a boolean",
        ParameterType::Array => "an array",
        ParameterType::Object => "an object",
    }
}

fn describe_json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, param_type: ParameterType, required: bool) -> Parameter {
        Parameter {
            name: name.to_string(),
            param_type,
            required,
            description: String::new(),
            r#enum: None,
            items: None,
        }
    }

    #[test]
    fn accepts_valid_arguments() {
        let parameters = vec![param("path", ParameterType::String, true)];
        assert!(validate_arguments(r#"{"path": "/tmp/a"}"#, &parameters).is_ok());
    }

    #[test]
    fn rejects_missing_required_parameter() {
        let parameters = vec![param("path", ParameterType::String, true)];
        let err = validate_arguments("{}", &parameters).unwrap_err();
        assert!(matches!(err, CoreError::ToolArgumentError(_)));
    }

    #[test]
    fn rejects_wrong_type() {
        let parameters = vec![param("count", ParameterType::Integer, true)];
        let err = validate_arguments(r#"{"count": "five"}"#, &parameters).unwrap_err();
        assert!(matches!(err, CoreError::ToolArgumentError(_)));
    }

    #[test]
    fn rejects_non_object_arguments() {
        let parameters = vec![];
        let err = validate_arguments("[1,2,3]", &parameters).unwrap_err();
        assert!(matches!(err, CoreError::ToolArgumentError(_)));
    }

    #[test]
    fn tolerates_unknown_extra_keys() {
        let parameters = vec![param("path", ParameterType::String, true)];
        assert!(validate_arguments(r#"{"path": "/tmp/a", "extra": 1}"#, &parameters).is_ok());
    }

    #[test]
    fn enforces_enum_membership() {
        let mut parameter = param("mode", ParameterType::String, true);
        parameter.r#enum = Some(vec!["read".into(), "write".into()]);
        let parameters = vec![parameter];
        assert!(validate_arguments(r#"{"mode": "read"}"#, &parameters).is_ok());
        let err = validate_arguments(r#"{"mode": "delete"}"#, &parameters).unwrap_err();
        assert!(matches!(err, CoreError::ToolArgumentError(_)));
    }
}
