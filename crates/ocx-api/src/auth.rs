//! Session user extraction.
//!
//! The front proxy authenticates the browser session and forwards the
//! resolved user id in `x-user-id`. Handlers that need an owner take
//! [`SessionUser`] as an extractor; requests without the header get 401
//! before the handler body runs.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user owning the current request.
#[derive(Debug, Clone)]
pub struct SessionUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| SessionUser(value.to_string()))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<SessionUser, (StatusCode, Json<Value>)> {
        let (mut parts, _) = request.into_parts();
        SessionUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_user_id() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "user-42")
            .body(())
            .unwrap();

        let SessionUser(user_id) = extract(request).await.unwrap();
        assert_eq!(user_id, "user-42");
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let request = Request::builder().body(()).unwrap();

        let result = extract(request).await;
        let (status, _) = result.err().unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_header_rejected() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "")
            .body(())
            .unwrap();

        assert!(extract(request).await.is_err());
    }
}
