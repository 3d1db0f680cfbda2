use actix_web::HttpResponse;

/// Liveness check. Touches neither the store nor the upstream APIs.
#[tracing::instrument(name = "Health check handler")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
