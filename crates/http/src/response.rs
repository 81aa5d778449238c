//! Response envelope shared by every endpoint and the extractors whose
//! rejections render as that envelope.

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// Outcome tag carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    /// Client-side failure (4xx)
    Fail,
    /// Server-side failure (5xx)
    Error,
}

/// `{status, message?, data?}` body returned by the API.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn message(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::message(Status::Success, message)
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

/// `axum::Json` whose rejections render as fail envelopes.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejections render as fail envelopes.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Paging {
        page: u32,
    }

    #[tokio::test]
    async fn query_rejection_renders_fail_envelope() {
        let app = Router::new().route(
            "/shelves",
            get(|ApiQuery(paging): ApiQuery<Paging>| async move { paging.page.to_string() }),
        );

        let response = app
            .clone()
            .oneshot(Request::get("/shelves?page=2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/shelves?page=two").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "fail");
        assert!(body["message"].is_string());
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let body = serde_json::to_value(Envelope::<()>::success("Buku berhasil dihapus")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "success", "message": "Buku berhasil dihapus"})
        );
    }

    #[test]
    fn envelope_carries_message_and_data() {
        let body = serde_json::to_value(
            Envelope::success("Buku berhasil ditambahkan")
                .with_data(serde_json::json!({"bookId": "abc"})),
        )
        .unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Buku berhasil ditambahkan");
        assert_eq!(body["data"]["bookId"], "abc");
    }
}
