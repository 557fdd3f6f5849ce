use aide::{axum::ApiRouter, openapi::OpenApi, scalar::Scalar};
use axum::{routing::get, Extension, Json};

/// Scalar UI at `/docs`, reading the generated document from `/openapi.json`
pub fn handler() -> ApiRouter {
    let scalar = Scalar::new("/openapi.json").with_title("Verification Gateway API");

    ApiRouter::new()
        .route("/docs", scalar.axum_route())
        .route("/openapi.json", get(openapi_document))
}

#[allow(clippy::unused_async)]
async fn openapi_document(Extension(openapi): Extension<OpenApi>) -> Json<OpenApi> {
    Json(openapi)
}
