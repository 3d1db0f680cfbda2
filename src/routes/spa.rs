use actix_web::{http::header::ContentType, http::Method, web, HttpRequest, HttpResponse};
use std::path::PathBuf;

/// Location of the front-end entry document served for every unmatched path.
#[derive(Debug, Clone)]
pub struct SpaIndex(pub PathBuf);

#[tracing::instrument(name = "Serving the front-end entry document", skip(request, index))]
pub async fn serve_spa_index(request: HttpRequest, index: web::Data<SpaIndex>) -> HttpResponse {
    if *request.method() != Method::GET && *request.method() != Method::HEAD {
        return HttpResponse::NotFound().finish();
    }

    match tokio::fs::read(&index.0).await {
        Ok(contents) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(contents),
        Err(err) => {
            tracing::error!("Failed to read {}: {:?}", index.0.display(), err);
            HttpResponse::NotFound().finish()
        }
    }
}
