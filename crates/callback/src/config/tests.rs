use super::*;

#[test]
fn empty_text_yields_defaults() {
	assert_eq!(CallbackConfig::from_toml_str("").unwrap(), CallbackConfig::default());
}

#[test]
fn parses_kebab_case_keys() {
	let config = CallbackConfig::from_toml_str("duplicate-policy = \"ignore\"\ntrace-dropped = false\n").unwrap();
	assert_eq!(config.duplicate_policy, DuplicatePolicy::Ignore);
	assert!(!config.trace_dropped);
}

#[test]
fn partial_config_keeps_other_defaults() {
	let config = CallbackConfig::from_toml_str("trace-dropped = false").unwrap();
	assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
	assert!(!config.trace_dropped);
}

#[test]
fn rejects_unknown_keys() {
	let err = CallbackConfig::from_toml_str("retry = 3").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn rejects_unknown_policy() {
	let err = CallbackConfig::from_toml_str("duplicate-policy = \"panic\"").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)));
}
