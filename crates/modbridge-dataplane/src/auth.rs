//! Optional bearer-token check on the data-plane HTTP surface (§9: whether
//! the surface needs authentication at all is a deployment-time decision --
//! see `DESIGN.md`). When `DATAPLANE_AUTH_TOKEN` is unset, this layer is not
//! installed and every request passes through unchanged.

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

#[derive(Clone)]
pub struct RequiredToken(pub String);

pub async fn require_bearer_token(
    State(expected): State<RequiredToken>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected.0 => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
