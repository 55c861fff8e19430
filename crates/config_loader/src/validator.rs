//! Config validation
//!
//! Rules:
//! - declarative field rules from the `Validate` derive (address, limits, routing key)
//! - deadline_ms > 0 when set
//! - max_message_bytes > 0 when set

use contracts::{ClientConfig, LoggingError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a ClientConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ClientConfig) -> Result<(), LoggingError> {
    if let Err(errors) = config.validate() {
        let (field, message) = first_violation("", &errors)
            .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
        return Err(LoggingError::config_validation(field, message));
    }
    validate_transport(config)?;
    Ok(())
}

fn validate_transport(config: &ClientConfig) -> Result<(), LoggingError> {
    let transport = &config.transport;
    if transport.deadline_ms == Some(0) {
        return Err(LoggingError::config_validation(
            "transport.deadline_ms",
            "deadline_ms must be > 0",
        ));
    }
    if transport.max_message_bytes == Some(0) {
        return Err(LoggingError::config_validation(
            "transport.max_message_bytes",
            "max_message_bytes must be > 0, omit it for unlimited",
        ));
    }
    Ok(())
}

/// Flatten nested validator output into a dotted field path and message
fn first_violation(prefix: &str, errors: &ValidationErrors) -> Option<(String, String)> {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(e) = field_errors.first() {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_violation(&path, inner) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    if let Some(found) = first_violation(&format!("{path}[{idx}]"), inner) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}
