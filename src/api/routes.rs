use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::web;

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health checks
        .route("/health", web::get().to(handlers::health_check))
        .service(
            web::resource("/metrics")
                .wrap(Compress::default())
                .route(web::get().to(handlers::metrics_endpoint))
        )

        // Appendix generation; DOCX and PDF bodies are already compressed
        .service(
            web::resource("/upload")
                .wrap(
                    Cors::default()
                        .allowed_origin_fn(|origin, _req_head| {
                            origin.as_bytes().starts_with(b"http://localhost") ||
                            origin.as_bytes().starts_with(b"https://")
                        })
                        .allowed_methods(vec!["POST"])
                        .allowed_headers(vec!["Content-Type"])
                        .expose_headers(vec!["Content-Disposition"])
                        .max_age(3600)
                )
                .route(web::post().to(handlers::upload))
        );
}
