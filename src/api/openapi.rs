use crate::api::handlers::{
    admin, gate, health, session, session_panic_response, verify_panic_response,
};
use tower_http::catch_panic::CatchPanicLayer;
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI document.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Each group carries its own panic fallback: the password verifiers answer
/// `500 {"success": false}` while the session check answers
/// `200 {"authenticated": false}`.
/// Routes added outside (like `OPTIONS /health`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    let verifiers = OpenApiRouter::new()
        .routes(routes!(gate::gate_status, gate::verify_site_password))
        .routes(routes!(admin::verify_admin_password))
        .layer(CatchPanicLayer::custom(verify_panic_response));

    let sessions = OpenApiRouter::new()
        .routes(routes!(session::me))
        .layer(CatchPanicLayer::custom(session_panic_response));

    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .merge(verifiers)
        .merge(sessions);

    router.get_openapi_mut().tags = Some(vec![
        tag("gate", "Site-wide password gate"),
        tag("admin", "Admin area password check"),
        tag("auth", "Identity token session check"),
        tag("health", "Service health"),
    ]);

    router
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|trimmed| !trimmed.is_empty())
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (
            optional_str(name),
            optional_str(email.trim_end().trim_end_matches('>')),
        ),
        None => (optional_str(author), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Roofers in Florida <info@roofersinflorida.com>"),
            (Some("Roofers in Florida"), Some("info@roofersinflorida.com"))
        );
        assert_eq!(parse_author("Jane Roe"), (Some("Jane Roe"), None));
        assert_eq!(parse_author("<ops@example.com>"), (None, Some("ops@example.com")));
        assert_eq!(parse_author("  "), (None, None));
    }

    #[test]
    fn openapi_documents_every_endpoint() {
        let doc = openapi();
        for path in [
            "/health",
            "/api/password-verify",
            "/api/admin/verify-password",
            "/api/auth/me",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        let tags = doc.tags.unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "gate"));
    }

    #[test]
    fn gate_status_schema_has_no_password() {
        let doc = openapi();
        let schema = doc
            .components
            .and_then(|components| components.schemas.get("GateStatusResponse").cloned());
        let json = serde_json::to_string(&schema).unwrap_or_default();
        assert!(json.contains("passwordProtected"));
        assert!(!json.contains("\"password\""));
    }

    #[test]
    fn password_request_schema_is_documented() {
        let doc = openapi();
        let schema = doc
            .components
            .and_then(|components| components.schemas.get("PasswordRequest").cloned());
        assert!(schema.is_some());
        let json = serde_json::to_string(&schema).unwrap_or_default();
        assert!(json.contains("\"password\""));
    }
}
