//! Import-ID helpers
//!
//! Import hands the provider nothing but a user-typed string. These helpers
//! cover the three shapes that string takes: an opaque key copied through,
//! a numeric identifier, and a comma-delimited composite.

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Copy the raw import ID into a single string attribute.
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let mut state = DynamicValue::empty_object();

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                "Failed to set import ID",
                format!("could not set '{}' to '{}': {}", attr_path, request.id, e),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

/// Parse the import ID as an `i64` and store it in a number attribute.
///
/// The standard shape for API-assigned identifiers: `terraform import`
/// passes a decimal string, state carries a number.
pub fn import_numeric_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let id: i64 = match request.id.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            response.diagnostics.push(
                Diagnostic::error(
                    "Invalid import ID",
                    format!("expected a numeric ID, got '{}'", request.id),
                )
                .with_attribute(attr_path),
            );
            return;
        }
    };

    let mut state = DynamicValue::empty_object();
    if let Err(e) = state.set_i64(&attr_path, id) {
        response.diagnostics.push(
            Diagnostic::error(
                "Failed to set import ID",
                format!("could not set '{}': {}", attr_path, e),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

/// Split a comma-delimited composite import ID into exactly `arity` parts.
///
/// `"group_id,user_id"`-style IDs: positional, fixed arity per resource.
pub fn split_composite_id(id: &str, arity: usize) -> Result<Vec<String>, Diagnostic> {
    let parts: Vec<String> = id.split(',').map(|p| p.trim().to_string()).collect();

    if parts.len() != arity || parts.iter().any(|p| p.is_empty()) {
        return Err(Diagnostic::error(
            "Invalid import ID",
            format!(
                "expected {} comma-separated values, got '{}'",
                arity, id
            ),
        ));
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import_request(id: &str) -> ImportResourceStateRequest {
        ImportResourceStateRequest {
            type_name: "filehub_thing".to_string(),
            id: id.to_string(),
        }
    }

    fn empty_response() -> ImportResourceStateResponse {
        ImportResourceStateResponse {
            imported_resources: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn passthrough_copies_id_string() {
        let ctx = Context::new();
        let request = import_request("folder/reports");
        let mut response = empty_response();

        import_state_passthrough_id(&ctx, AttributePath::new("path"), &request, &mut response);

        assert!(response.diagnostics.is_empty());
        let state = &response.imported_resources[0].state;
        assert_eq!(
            state.get_string(&AttributePath::new("path")).unwrap(),
            "folder/reports"
        );
    }

    #[test]
    fn numeric_id_parses_to_number() {
        let ctx = Context::new();
        let request = import_request("123456");
        let mut response = empty_response();

        import_numeric_id(&ctx, AttributePath::new("id"), &request, &mut response);

        assert!(response.diagnostics.is_empty());
        let state = &response.imported_resources[0].state;
        assert_eq!(state.get_i64(&AttributePath::new("id")).unwrap(), 123456);
    }

    #[test]
    fn numeric_id_rejects_garbage() {
        let ctx = Context::new();
        let request = import_request("not-a-number");
        let mut response = empty_response();

        import_numeric_id(&ctx, AttributePath::new("id"), &request, &mut response);

        assert!(response.imported_resources.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("not-a-number"));
    }

    #[test]
    fn composite_id_splits_on_arity() {
        let parts = split_composite_id("17,93", 2).unwrap();
        assert_eq!(parts, vec!["17".to_string(), "93".to_string()]);
    }

    #[test]
    fn composite_id_rejects_wrong_arity() {
        assert!(split_composite_id("17", 2).is_err());
        assert!(split_composite_id("17,93,4", 2).is_err());
        assert!(split_composite_id("17,", 2).is_err());
    }
}
