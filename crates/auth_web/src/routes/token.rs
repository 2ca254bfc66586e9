use actix_web::http::StatusCode;
use actix_web::{post, web, HttpResponse, ResponseError};
use anyhow::Context;
use auth_core::{CredentialStore, Credentials, TokenIssuer};
use secrecy::Secret;

use crate::utils::{error_chain_fmt, ErrorResponse};

/// Absent or `null` fields are a credential mismatch, not a malformed body.
#[derive(serde::Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<Secret<String>>,
}

#[derive(serde::Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl LoginError {
    fn code(&self) -> &'static str {
        match self {
            LoginError::InvalidCredentials => "invalid_credentials",
            LoginError::UnexpectedError(_) => "internal_error",
        }
    }
}

impl std::fmt::Debug for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LoginError {
    fn status_code(&self) -> StatusCode {
        match self {
            LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LoginError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse { error: self.code() })
    }
}

#[post("/login")]
#[tracing::instrument(
    name = "Issuing a token",
    skip(request, credential_store, issuer),
    fields(username = tracing::field::Empty)
)]
pub async fn login(
    request: web::Json<LoginRequest>,
    credential_store: web::Data<dyn CredentialStore>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, LoginError> {
    let LoginRequest { username, password } = request.into_inner();
    let credentials = match (username, password) {
        (Some(username), Some(password)) => {
            tracing::Span::current().record("username", tracing::field::display(&username));
            Credentials { username, password }
        }
        _ => {
            tracing::info!("Rejected a login attempt with missing fields");
            return Err(LoginError::InvalidCredentials);
        }
    };

    if !credential_store.is_authenticated(&credentials) {
        tracing::info!("Rejected a login attempt");
        return Err(LoginError::InvalidCredentials);
    }

    let token = issuer
        .issue(&credentials.username)
        .context("Failed to issue a token for an authenticated user")?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Bodies that are not JSON objects get a machine-readable 400 instead of the
/// deserializer's message.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::info!(error = %err, "Rejected a login body that is not valid JSON");
        let response = HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_request",
        });
        actix_web::error::InternalError::from_response(err, response).into()
    })
}
