//! `#{ENV_NAME}#` configuration indirection for [`crate::ToolDyn`] (spec §4.3, §9).
//!
//! Mirrors `chorus_provider::resolve_api_key`'s substitution rule, applied to every
//! value in a tool's `configuration` map instead of a single `api_key_ref` field.

use chorus_core::CoreError;
use std::collections::HashMap;

/// Resolve every value of a tool's `configuration` map.
///
/// - A literal value (no `#{...}#` wrapper) passes through unchanged.
/// - `#{NAME}#` is substituted from `std::env::var("NAME")`; a missing var fails the
///   whole resolution rather than silently dropping the key.
pub fn resolve_configuration(
    configuration: &HashMap<String, String>,
) -> Result<HashMap<String, String>, CoreError> {
    configuration
        .iter()
        .map(|(key, value)| Ok((key.clone(), resolve_value(value)?)))
        .collect()
}

fn resolve_value(value: &str) -> Result<String, CoreError> {
    match value.strip_prefix("#{").and_then(|s| s.strip_suffix("}#")) {
        Some(env_name) => std::env::var(env_name).map_err(|_| {
            CoreError::ConfigError(format!("env var {env_name} not set"))
        }),
        None => Ok(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_values_pass_through() {
        let mut configuration = HashMap::new();
        configuration.insert("root".to_string(), "/tmp/workspace".to_string());
        let resolved = resolve_configuration(&configuration).unwrap();
        assert_eq!(resolved["root"], "/tmp/workspace");
    }

    #[test]
    fn env_placeholders_are_substituted() {
        std::env::set_var("CHORUS_TEST_TOOL_CONFIG", "resolved");
        let mut configuration = HashMap::new();
        configuration.insert("key".to_string(), "#{CHORUS_TEST_TOOL_CONFIG}#".to_string());
        let resolved = resolve_configuration(&configuration).unwrap();
        assert_eq!(resolved["key"], "resolved");
        std::env::remove_var("CHORUS_TEST_TOOL_CONFIG");
    }

    #[test]
    fn missing_env_var_is_config_error() {
        std::env::remove_var("CHORUS_TEST_TOOL_CONFIG_MISSING");
        let mut configuration = HashMap::new();
        configuration.insert(
            "key".to_string(),
            "#{CHORUS_TEST_TOOL_CONFIG_MISSING}#".to_string(),
        );
        let err = resolve_configuration(&configuration).unwrap_err();
        assert!(matches!(err, CoreError::ConfigError(_)));
    }
}
