use axum::{body::Body, http::Request, middleware::Next, response::Response};
use nanoid::nanoid;
use tracing::Instrument;

use crate::state::RequestId;

/// Tag every request with an id, expose it to handlers via extensions and to
/// clients via the X-Request-Id header, and carry it on the log span.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = format!("req_{}", nanoid!(16));
    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!("request", request_id = %id);
    let mut resp = next.run(req).instrument(span).await;

    if let Ok(value) = id.parse() {
        resp.headers_mut().insert("X-Request-Id", value);
    }
    resp
}
