use std::path::Path;
use std::time::Duration;

use auth_core::{SigningConfigError, StaticCredentialStore, TokenIssuer, TokenVerifier};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub authentication: AuthenticationSettings,
    pub credentials: CredentialSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct AuthenticationSettings {
    pub signing_secret: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub token_validity_seconds: u64,
    pub protect_api: bool,
}

impl AuthenticationSettings {
    pub fn token_validity(&self) -> Duration {
        Duration::from_secs(self.token_validity_seconds)
    }

    pub fn issuer(&self) -> Result<TokenIssuer, SigningConfigError> {
        TokenIssuer::new(&self.signing_secret, self.token_validity())
    }

    pub fn verifier(&self) -> Result<TokenVerifier, SigningConfigError> {
        TokenVerifier::new(&self.signing_secret)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct CredentialSettings {
    pub username: String,
    pub password: Secret<String>,
}

impl CredentialSettings {
    pub fn store(&self) -> StaticCredentialStore {
        StaticCredentialStore::new(self.username.clone(), self.password.clone())
    }
}

/// Read the settings for the environment named by `APP_ENVIRONMENT`
/// (`local` when unset).
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    get_configuration_for(environment)
}

pub fn get_configuration_for(environment: Environment) -> Result<Settings, config::ConfigError> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let base_path = Path::new(manifest_dir);
    let configuration_directory = base_path.join("configuration");

    let environment_filename = format!("{}.yaml", environment.as_str());
    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and
        // '__' as separator)
        // E.g. `APP_AUTHENTICATION__SIGNING_SECRET=...` would set
        // `Settings.authentication.signing_secret`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. \
            Use either `local` or `production`.",
                other
            )),
        }
    }
}
