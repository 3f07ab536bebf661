use crate::errors::ErrorResponse;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// Fills the `url` field of error bodies with the request path.
///
/// Works on responses produced by [`ErrorResponse::into_response_with`],
/// which keeps a copy of the body in the response extensions.
pub async fn attach_request_url(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    let Some(mut body) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };
    body.url = Some(path);

    match serde_json::to_vec(&body) {
        Ok(bytes) => {
            let headers = response.headers_mut();
            headers.remove(header::CONTENT_LENGTH);
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            *response.body_mut() = Body::from(bytes);
        }
        Err(e) => tracing::warn!("Failed to re-encode error body: {}", e),
    }

    response
}
