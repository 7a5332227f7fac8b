use axum::{body::Body, response::Response};
use serde_json::Value;

pub(crate) async fn get_json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    serde_json::from_slice(&body).expect("Response body was not JSON")
}
