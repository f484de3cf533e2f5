//! Basic authentication helpers for the Jira REST API.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// Returns the base64 encoded `user:password` pair used in Basic auth.
pub fn basic_auth_code(user: &str, password: &str) -> String {
    BASE64_STANDARD.encode(format!("{}:{}", user, password))
}

/// Returns the full `Authorization` header value for Basic auth.
pub fn basic_auth_header(user: &str, password: &str) -> String {
    format!("Basic {}", basic_auth_code(user, password))
}
