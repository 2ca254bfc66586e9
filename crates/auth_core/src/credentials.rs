use secrecy::{ExposeSecret, Secret};

/// Username and password as submitted by a caller. Untrusted.
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }
}

/// Decides whether a pair of credentials is valid.
///
/// Implementations must give the same answer for an unknown username and for
/// a wrong password, so callers cannot tell the two apart.
pub trait CredentialStore: Send + Sync {
    fn is_authenticated(&self, credentials: &Credentials) -> bool;
}

/// A store holding exactly one valid pair, fixed at construction.
pub struct StaticCredentialStore {
    username: String,
    password: Secret<String>,
}

impl StaticCredentialStore {
    pub fn new(username: impl Into<String>, password: Secret<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn is_authenticated(&self, credentials: &Credentials) -> bool {
        // Evaluate both comparisons; no early return on the username.
        let username_matches = credentials.username == self.username;
        let password_matches =
            credentials.password.expose_secret() == self.password.expose_secret();
        username_matches & password_matches
    }
}

impl std::fmt::Debug for StaticCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentialStore")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
