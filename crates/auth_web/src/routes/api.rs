use actix_web::{get, web, HttpResponse};

use crate::authentication::AuthenticatedSubject;

#[derive(serde::Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[get("/protected")]
#[tracing::instrument(
    name = "Serving protected data",
    skip(subject),
    fields(subject = tracing::field::Empty)
)]
pub async fn protected(subject: Option<web::ReqData<AuthenticatedSubject>>) -> HttpResponse {
    // Absent when the api scope is served without token checks.
    if let Some(subject) = subject {
        tracing::Span::current().record("subject", tracing::field::display(subject.as_str()));
    }
    HttpResponse::Ok().json(MessageResponse {
        message: "protected data access granted",
    })
}
