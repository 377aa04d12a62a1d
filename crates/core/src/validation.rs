//! Bridges `validator` derive output into [`CoreError`].

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// Run `validator` checks on a DTO and flatten any failures into a single
/// `CoreError::Validation` message of the form `field: message; ...`.
///
/// Nested structs and lists are named by path, e.g. `materials[0].quantity`.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(|e| CoreError::Validation(flatten(&e)))
}

fn flatten(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    collect(errors, "", &mut parts);
    parts.sort();
    parts.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, parts: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                parts.extend(errs.iter().map(|err| match &err.message {
                    Some(msg) => format!("{path}: {msg}"),
                    None => format!("{path}: invalid value ({})", err.code),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, parts),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), parts);
                }
            }
        }
    }
}

/// Validate that a free-text reason is present and not just whitespace.
pub fn validate_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A reason is required for this operation".to_string(),
        ));
    }
    Ok(())
}
