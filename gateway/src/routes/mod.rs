pub mod api;
mod docs;
mod health;
mod index;

use aide::axum::{routing::get, ApiRouter};

use crate::types::Environment;

/// Creates the router with all handler routes
///
/// `/docs` and `/openapi.json` are only mounted where the environment shows
/// API docs; elsewhere they fall through to 404.
pub fn handler(environment: Environment) -> ApiRouter {
    let router = ApiRouter::new()
        .route("/", axum::routing::get(index::handler))
        .api_route("/health", get(health::handler))
        .merge(api::handler());

    if environment.show_api_docs() {
        router.merge(docs::handler())
    } else {
        router
    }
}
