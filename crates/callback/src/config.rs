//! Dispatch policy configuration.

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// What a shared callback does with a second terminal dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
	/// Return `DispatchError::AlreadyCompleted` and log a warning.
	#[default]
	Reject,
	/// Discard the late outcome.
	Ignore,
}

/// Callback behaviour knobs.
///
/// ```toml
/// duplicate-policy = "ignore"
/// trace-dropped = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CallbackConfig {
	/// Handling of terminal dispatches after the first.
	pub duplicate_policy: DuplicatePolicy,
	/// Log outcomes that arrive on a channel without a handler.
	pub trace_dropped: bool,
}

impl Default for CallbackConfig {
	fn default() -> Self {
		Self {
			duplicate_policy: DuplicatePolicy::Reject,
			trace_dropped: true,
		}
	}
}

impl CallbackConfig {
	/// Parses a configuration from TOML text. Missing keys take their defaults.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
	}
}

#[cfg(test)]
mod tests;
