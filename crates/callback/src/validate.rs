use crate::error::{ConfigError, Result};

/// Checks that a callback can observe every outcome its operation can produce.
///
/// When the operation declares user exceptions, at least one of the result and
/// user-exception handlers must be present. A local-exception handler is never
/// required: leaving it out means runtime failures are dropped.
pub const fn validate(has_result: bool, user_exceptions_possible: bool, has_user_exception: bool) -> Result<()> {
	if user_exceptions_possible && !has_result && !has_user_exception {
		return Err(ConfigError::Unobservable);
	}
	Ok(())
}
