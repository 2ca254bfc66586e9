use auth_core::{TokenIssuer, TokenVerifier};
use auth_web::{
    configuration::{get_configuration, Settings},
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub test_user: TestUser,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
}

pub struct TestUser {
    pub username: String,
    pub password: String,
}

impl TestUser {
    pub fn generate() -> Self {
        Self {
            username: SafeEmail().fake(),
            password: Uuid::new_v4().to_string(),
        }
    }

    fn install(&self, configuration: &mut Settings) {
        configuration.credentials.username = self.username.clone();
        configuration.credentials.password = Secret::new(self.password.clone());
    }

    fn configured_in(configuration: &Settings) -> Self {
        Self {
            username: configuration.credentials.username.clone(),
            password: configuration.credentials.password.expose_secret().clone(),
        }
    }
}

impl TestApp {
    pub async fn get_health_check(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/health_check", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(&format!("{}/login", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw_login(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/login", &self.address))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Log in as the test user and return the issued token.
    pub async fn login_test_user(&self) -> String {
        let response = self
            .post_login(&serde_json::json!({
                "username": &self.test_user.username,
                "password": &self.test_user.password,
            }))
            .await;
        assert_eq!(200, response.status().as_u16());
        let body: serde_json::Value = response.json().await.expect("Invalid JSON body.");
        body["token"]
            .as_str()
            .expect("The response carries no token.")
            .to_string()
    }

    pub async fn get_protected(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/api/protected", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_protected_with_token(&self, token: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/api/protected", &self.address))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_protected_with_authorization(&self, value: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/api/protected", &self.address))
            .header(reqwest::header::AUTHORIZATION, value)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Configuration read from disk, listening on a random port.
pub fn test_configuration() -> Settings {
    let mut c = get_configuration().expect("Failed to read configuration");
    // Wildcard port, the system will find available port
    c.application.port = 0;
    c
}

/// Spawn the application with a freshly generated user as the only valid
/// credential pair.
pub async fn spawn_app() -> TestApp {
    let test_user = TestUser::generate();
    spawn_app_with(|c| test_user.install(c)).await
}

pub async fn spawn_app_with<F>(configure: F) -> TestApp
where
    F: FnOnce(&mut Settings),
{
    // Singleton Pattern
    Lazy::force(&TRACING);

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let configuration = {
        let mut c = test_configuration();
        configure(&mut c);
        c
    };
    let app = Application::build(configuration.clone())
        .await
        .expect("Failed to build application");
    let port = app.port();
    let address = format!("http://127.0.0.1:{}", port);

    // Run the application
    let _ = tokio::spawn(app.run_until_stopped());
    TestApp {
        address,
        api_client,
        test_user: TestUser::configured_in(&configuration),
        issuer: configuration.authentication.issuer().unwrap(),
        verifier: configuration.authentication.verifier().unwrap(),
    }
}
