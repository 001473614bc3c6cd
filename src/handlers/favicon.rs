use axum::http::StatusCode;

pub async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}
