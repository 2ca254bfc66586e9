// Authentication Service (AS) building blocks.
// Credentials are checked against an injected store, tokens are issued and
// verified with one symmetric signing secret.
pub mod claims;
pub mod credentials;
pub mod token;

pub use claims::Claims;
pub use credentials::{CredentialStore, Credentials, StaticCredentialStore};
pub use token::{SigningConfigError, TokenError, TokenIssuer, TokenVerifier};
