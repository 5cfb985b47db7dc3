use super::*;

#[derive(Debug, thiserror::Error)]
#[error("pool went missing: db exploded at row 7")]
struct Boom;

impl ErrorCode for Boom {
    fn error_code(&self) -> &'static str {
        "test/boom"
    }
}

#[test]
fn client_errors_keep_their_message() {
    let err = ApiError::from_coded(StatusCode::CONFLICT, &Boom);
    assert_eq!(err.code, "test/boom");
    assert_eq!(err.message, "pool went missing: db exploded at row 7");
}

#[test]
fn server_errors_hide_detail() {
    let err = ApiError::from_coded(StatusCode::INTERNAL_SERVER_ERROR, &Boom);
    assert_eq!(err.code, "test/boom");
    assert_eq!(err.message, "internal error");
}

#[tokio::test]
async fn renders_json_body_with_status() {
    let response = ApiError::unauthorized().into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.code, "auth/unauthenticated");
}
