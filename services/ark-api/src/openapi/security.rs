//! Security declarations for the published OpenAPI document.
//!
//! The schema generated from the routes knows nothing about authentication.
//! [`add_security_to_openapi`] describes the configured auth mode on top of
//! it and exempts public routes.

use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

use crate::auth::AuthMode;

const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "options", "head"];

/// Adds security schemes and requirements for `auth_mode` to `schema`.
///
/// Top-level requirements list one entry per scheme, so any single scheme is
/// enough. Every operation under a path in `public_routes` gets an empty
/// requirement list, which overrides the global one.
pub fn add_security_to_openapi(
    mut schema: Value,
    auth_mode: AuthMode,
    public_routes: &BTreeSet<String>,
) -> Value {
    let Some(root) = schema.as_object_mut() else {
        return schema;
    };

    let mut schemes = Map::new();
    let mut global_security = Vec::new();

    if auth_mode.accepts_bearer() {
        schemes.insert(
            "bearerAuth".to_string(),
            json!({
                "type": "http",
                "scheme": "bearer",
                "bearerFormat": "JWT",
                "description": "Provide a valid OIDC/JWT bearer token."
            }),
        );
        global_security.push(json!({ "bearerAuth": [] }));
    }

    if auth_mode.accepts_basic() {
        schemes.insert(
            "basicAuth".to_string(),
            json!({
                "type": "http",
                "scheme": "basic",
                "description": "Use API key pair as Basic auth: public_key:secret_key."
            }),
        );
        global_security.push(json!({ "basicAuth": [] }));
    }

    root.entry("components")
        .or_insert_with(|| Value::Object(Map::new()));
    if schemes.is_empty() {
        root.remove("security");
    } else {
        if let Some(components) = root.get_mut("components").and_then(Value::as_object_mut) {
            components.insert("securitySchemes".to_string(), Value::Object(schemes));
        }
        root.insert("security".to_string(), Value::Array(global_security));
    }

    if let Some(paths) = root.get_mut("paths").and_then(Value::as_object_mut) {
        for (path, path_item) in paths.iter_mut() {
            if !public_routes.contains(path) {
                continue;
            }
            let Some(operations) = path_item.as_object_mut() else {
                continue;
            };
            for (method, operation) in operations.iter_mut() {
                if !HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                    continue;
                }
                if let Some(operation) = operation.as_object_mut() {
                    operation.insert("security".to_string(), Value::Array(Vec::new()));
                }
            }
        }
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_schema() -> Value {
        json!({
            "openapi": "3.1.0",
            "info": { "title": "test", "version": "1" },
            "security": [{ "legacyAuth": [] }],
            "paths": {
                "/health": {
                    "get": { "responses": {} },
                    "parameters": []
                },
                "/openai/v1/chat/completions": {
                    "post": { "responses": {} }
                }
            }
        })
    }

    fn public() -> BTreeSet<String> {
        ["/health".to_string()].into_iter().collect()
    }

    #[test]
    fn test_open_mode_has_no_security() {
        let schema = add_security_to_openapi(base_schema(), AuthMode::Open, &public());
        assert!(schema.get("security").is_none());
        assert!(schema["components"].get("securitySchemes").is_none());
        assert!(schema["components"].is_object());
    }

    #[test]
    fn test_basic_mode() {
        let schema = add_security_to_openapi(base_schema(), AuthMode::Basic, &public());
        let schemes = &schema["components"]["securitySchemes"];
        assert_eq!(schemes["basicAuth"]["scheme"], "basic");
        assert!(schemes.get("bearerAuth").is_none());
        assert_eq!(schema["security"], json!([{ "basicAuth": [] }]));
    }

    #[test]
    fn test_sso_mode() {
        let schema = add_security_to_openapi(base_schema(), AuthMode::Sso, &public());
        let schemes = &schema["components"]["securitySchemes"];
        assert_eq!(schemes["bearerAuth"]["scheme"], "bearer");
        assert_eq!(schemes["bearerAuth"]["bearerFormat"], "JWT");
        assert_eq!(schema["security"], json!([{ "bearerAuth": [] }]));
    }

    #[test]
    fn test_hybrid_mode_lists_both_schemes() {
        let schema = add_security_to_openapi(base_schema(), AuthMode::Hybrid, &public());
        let schemes = &schema["components"]["securitySchemes"];
        assert!(schemes.get("bearerAuth").is_some());
        assert!(schemes.get("basicAuth").is_some());
        assert_eq!(
            schema["security"],
            json!([{ "bearerAuth": [] }, { "basicAuth": [] }])
        );
    }

    #[test]
    fn test_public_routes_are_unlocked_in_every_mode() {
        for mode in [AuthMode::Open, AuthMode::Basic, AuthMode::Sso, AuthMode::Hybrid] {
            let schema = add_security_to_openapi(base_schema(), mode, &public());
            assert_eq!(schema["paths"]["/health"]["get"]["security"], json!([]), "{mode}");
            // Non-operation keys under the path are left alone
            assert_eq!(schema["paths"]["/health"]["parameters"], json!([]));
            assert!(
                schema["paths"]["/openai/v1/chat/completions"]["post"]
                    .get("security")
                    .is_none()
            );
        }
    }

    #[test]
    fn test_non_object_schema_is_returned_unchanged() {
        let schema = add_security_to_openapi(json!([]), AuthMode::Hybrid, &public());
        assert_eq!(schema, json!([]));
    }
}
