use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::{web, HttpMessage, HttpResponse};
use auth_core::{TokenError, TokenVerifier};

use crate::utils::{error_chain_fmt, ErrorResponse};

/// The subject of the token that let a request through.
#[derive(Clone, Debug)]
pub struct AuthenticatedSubject(String);

impl AuthenticatedSubject {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthenticatedSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error)]
pub enum BearerError {
    #[error("The request does not carry a bearer token")]
    MissingToken,
    #[error("The bearer token was rejected")]
    InvalidToken(#[source] TokenError),
    #[error("No token verifier is registered with the application")]
    MissingVerifier,
}

impl std::fmt::Debug for BearerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl BearerError {
    fn response(&self) -> HttpResponse {
        match self {
            BearerError::MissingVerifier => {
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "internal_error",
                })
            }
            BearerError::MissingToken | BearerError::InvalidToken(_) => {
                HttpResponse::Unauthorized()
                    .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                    .json(ErrorResponse {
                        error: "invalid_token",
                    })
            }
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
/// The scheme name is matched case-insensitively.
fn bearer_token(request: &ServiceRequest) -> Result<String, BearerError> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(BearerError::MissingToken)?;
    let (scheme, token) = value.split_once(' ').ok_or(BearerError::MissingToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(BearerError::MissingToken);
    }
    Ok(token.to_owned())
}

fn authenticate(request: &ServiceRequest) -> Result<AuthenticatedSubject, BearerError> {
    let verifier = request
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or(BearerError::MissingVerifier)?;
    let token = bearer_token(request)?;
    let claims = verifier.verify(&token).map_err(BearerError::InvalidToken)?;
    Ok(AuthenticatedSubject(claims.sub))
}

/// Let a request through only if it carries a valid, unexpired token.
///
/// On success the token subject is available to handlers as
/// `web::ReqData<AuthenticatedSubject>`.
pub async fn reject_invalid_tokens(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    match authenticate(&req) {
        Ok(subject) => {
            tracing::debug!(%subject, "Accepted bearer token");
            req.extensions_mut().insert(subject);
            next.call(req).await
        }
        Err(e) => {
            tracing::warn!(error.cause_chain = ?e, "Rejected a request to a protected route");
            let response = e.response();
            Err(InternalError::from_response(e, response).into())
        }
    }
}
