use axum::response::Html;

/// Landing page hosting the verification widget
pub async fn handler() -> Html<&'static str> {
    Html(include_str!("../../public/index.html"))
}
