use auth_web::configuration::{get_configuration_for, Environment};
use auth_web::startup::Application;
use secrecy::Secret;

use crate::helpers::test_configuration;

#[tokio::test]
async fn an_empty_signing_secret_prevents_startup() {
    let mut configuration = test_configuration();
    configuration.authentication.signing_secret = Secret::new("   ".to_string());

    let outcome = Application::build(configuration).await;

    assert!(outcome.is_err());
}

#[tokio::test]
async fn a_zero_token_validity_prevents_startup() {
    let mut configuration = test_configuration();
    configuration.authentication.token_validity_seconds = 0;

    let outcome = Application::build(configuration).await;

    assert!(outcome.is_err());
}

#[test]
fn production_settings_without_a_signing_secret_are_refused() {
    // production.yaml carries no secret; it has to come from the environment.
    if std::env::var("APP_AUTHENTICATION__SIGNING_SECRET").is_ok() {
        return;
    }

    let error = match get_configuration_for(Environment::Production) {
        Ok(_) => panic!("Production settings loaded without a signing secret."),
        Err(e) => e.to_string(),
    };

    assert!(
        error.contains("missing field `signing_secret`"),
        "Unexpected configuration error: {}",
        error
    );
}
