use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Authenticated identity forwarded by the auth layer in front of this
/// service. Credentials are not re-verified here.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Customer,
    Staff,
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        self.role == ActorRole::Staff
    }
}

pub async fn require_identity(mut request: Request<Body>, next: Next) -> Response {
    let user_id = request
        .headers()
        .get("X-User-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
        .to_string();

    if user_id.is_empty() {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }

    let role = match request
        .headers()
        .get("X-User-Role")
        .and_then(|h| h.to_str().ok())
    {
        Some("STAFF") | Some("ADMIN") => ActorRole::Staff,
        _ => ActorRole::Customer,
    };

    request.extensions_mut().insert(Actor { user_id, role });
    next.run(request).await
}
