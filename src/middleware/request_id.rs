//! Request ID middleware for request tracing

use axum::http::{HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header name for request ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Sets a UUID v4 request id when the client sent none, and echoes it back
/// on the response.
pub fn request_id_layer() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header_name = HeaderName::from_static(X_REQUEST_ID);

    (
        SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(header_name),
    )
}

/// Read the request id back out of request headers, for log fields.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> Option<&str> {
        self.get(X_REQUEST_ID)?.to_str().ok()
    }
}
