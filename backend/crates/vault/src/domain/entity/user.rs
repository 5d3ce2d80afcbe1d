//! User Entity

use platform::password::Credential;

/// Registered user.
///
/// `api_key` holds the base64 encoding of the current key, if one has
/// been issued. Re-issuing overwrites it.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique login name
    pub name: String,
    /// Salt and derived password hash
    pub credential: Credential,
    /// Current API key (base64), if issued
    pub api_key: Option<String>,
}

impl User {
    /// Create a freshly registered user without an API key
    pub fn new(name: impl Into<String>, credential: Credential) -> Self {
        Self {
            name: name.into(),
            credential,
            api_key: None,
        }
    }
}
