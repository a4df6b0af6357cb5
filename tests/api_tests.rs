mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use std::sync::Arc;

use appendix_generator::api::{configure_routes, ApiState, AppConfig};
use appendix_generator::FormatConverter;
use common::{png, MultipartBody, StubRenderer};

fn state(root: &std::path::Path) -> ApiState {
    let converter = FormatConverter::new(Arc::new(StubRenderer)).with_temp_dir(root);
    ApiState::with_converter(AppConfig::default(), converter)
}

macro_rules! app {
    ($root:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state($root)))
                .configure(configure_routes),
        )
        .await
    };
}

fn upload(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/upload")
        .insert_header((header::CONTENT_TYPE, MultipartBody::content_type()))
        .set_payload(body)
}

#[actix_web::test]
async fn upload_with_defaults_returns_docx_attachment() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());

    let body = MultipartBody::new()
        .file("files", "plot.png", &png(10, 5))
        .file("files", "loss.png", &png(5, 10))
        .finish();
    let resp = test::call_service(&app, upload(body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=appendix.docx"
    );

    let bytes = test::read_body(resp).await;
    assert!(docx_rs::read_docx(&bytes).is_ok());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn upload_pdf_returns_pdf_attachment() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());

    let body = MultipartBody::new()
        .file("files", "plot.png", &png(10, 5))
        .text("output_format", "pdf")
        .text("paper_size", "Letter")
        .text("caption_position", "top")
        .text("image_width", "12")
        .finish();
    let resp = test::call_service(&app, upload(body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=appendix.pdf"
    );
    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn upload_without_files_is_bad_request() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());

    let body = MultipartBody::new().text("paper_size", "A4").finish();
    let resp = test::call_service(&app, upload(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn upload_with_width_out_of_range_is_bad_request() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());

    let body = MultipartBody::new()
        .file("files", "plot.png", &png(4, 4))
        .text("image_width", "42")
        .finish();
    let resp = test::call_service(&app, upload(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn upload_with_corrupt_image_is_unprocessable() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());

    let body = MultipartBody::new()
        .file("files", "broken.png", b"definitely not a png")
        .finish();
    let resp = test::call_service(&app, upload(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("broken.png"));
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn upload_with_undecodable_format_is_unprocessable() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());

    let mut ppm = b"P6\n2 2\n255\n".to_vec();
    ppm.extend_from_slice(&[0; 12]);
    let body = MultipartBody::new()
        .file("files", "plot.png", &png(4, 4))
        .file("files", "scan.ppm", &ppm)
        .finish();
    let resp = test::call_service(&app, upload(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("scan.ppm"));
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn health_reports_healthy() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());

    let req = test::TestRequest::get().uri("/health").to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "appendix-generator");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn metrics_endpoint_is_exposed() {
    let root = tempfile::tempdir().unwrap();
    let app = app!(root.path());
    appendix_generator::metrics::init();

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("appendix_generation_seconds"), "got: {text}");
}
