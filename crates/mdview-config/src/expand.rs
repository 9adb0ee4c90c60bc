//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a configuration value.
///
/// A `${VAR}` reference without a default is an error when `VAR` is unset.
/// Values without `${` are returned unchanged, so bare `$` in URLs is safe.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    if let Some(var) = first_unset_required(value) {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        });
    }

    Ok(shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok()).into_owned())
}

/// Name of the first `${VAR}` reference with no default whose variable is unset.
fn first_unset_required(value: &str) -> Option<&str> {
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let end = after.find('}')?;
        let reference = &after[..end];

        if !reference.contains(":-") && std::env::var_os(reference).is_none() {
            return Some(reference);
        }
        rest = &after[end + 1..];
    }
    None
}
