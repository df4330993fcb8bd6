use dpa_common::Secret;

/// Builds the value of an `Authorization` header for HTTP Basic authentication.
pub fn basic_auth_value(username: &str, password: &Secret<String>) -> String {
    let token = base64::encode(format!("{username}:{}", password.reveal()));
    format!("Basic {token}")
}
