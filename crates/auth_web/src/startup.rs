use std::{io::Error, net::TcpListener, sync::Arc};

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::header,
    middleware::{from_fn, Condition},
    web::{self, Data},
    App, HttpServer,
};
use anyhow::Context;
use auth_core::{CredentialStore, TokenIssuer, TokenVerifier};
use tracing_actix_web::TracingLogger;

use crate::{
    authentication::reject_invalid_tokens,
    configuration::Settings,
    routes::{health_check, json_config, login, protected},
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Build every shared component and bind the listener.
    ///
    /// Fails before anything is served if the signing setup is unusable.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let issuer = configuration
            .authentication
            .issuer()
            .context("Failed to set up token issuance")?;
        let verifier = configuration
            .authentication
            .verifier()
            .context("Failed to set up token verification")?;
        let credential_store: Arc<dyn CredentialStore> =
            Arc::new(configuration.credentials.store());

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        tracing::info!(
            %address,
            port,
            protect_api = configuration.authentication.protect_api,
            token_validity_seconds = configuration.authentication.token_validity_seconds,
            "Starting application"
        );

        let server = run(
            listener,
            issuer,
            verifier,
            credential_store,
            configuration.authentication.protect_api,
        )
        .await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), Error> {
        self.server.await
    }
}

async fn run(
    listener: TcpListener,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    credential_store: Arc<dyn CredentialStore>,
    protect_api: bool,
) -> Result<Server, anyhow::Error> {
    let issuer = Data::new(issuer);
    let verifier = Data::new(verifier);
    let credential_store: Data<dyn CredentialStore> = Data::from(credential_store);
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);
        App::new()
            // Logger middleware
            // Sent actix-web log to log subscriber
            .wrap(TracingLogger::default())
            .wrap(cors)
            .service(health_check)
            .service(login)
            .service(
                web::scope("/api")
                    .wrap(Condition::new(protect_api, from_fn(reject_invalid_tokens)))
                    .service(protected),
            )
            .app_data(json_config())
            .app_data(issuer.clone())
            .app_data(verifier.clone())
            .app_data(credential_store.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
