use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;

use common::types::Message;
use service::feedback::domain::FeedbackInput;

use crate::errors::ApiError;
use crate::extract::Payload;
use crate::state::ServerState;

/// Token part of `Authorization: Bearer <token>`; any other shape counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[utoipa::path(post, path = "/submit-feedback", tag = "feedback", request_body = crate::openapi::FeedbackRequest, responses((status = 201, description = "Feedback stored"), (status = 400, description = "Invalid body"), (status = 401, description = "Missing or invalid token")), security(("bearer" = [])))]
pub async fn submit_feedback(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Payload<FeedbackInput>, ApiError>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let token = bearer_token(&headers);
    // a missing or invalid token wins over a broken body
    let Payload(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            state.feedback.authorize(token)?;
            return Err(rejection);
        }
    };
    state.feedback.submit(token, input).await?;
    Ok((StatusCode::CREATED, Json(Message::new("Feedback submitted successfully."))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&with_auth("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&with_auth("bearer   tok")), Some("tok"));
    }

    #[test]
    fn other_shapes_are_absent() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&with_auth("Bearer")), None);
        assert_eq!(bearer_token(&with_auth("Bearer ")), None);
        assert_eq!(bearer_token(&with_auth("Basic dXNlcjpwdw==")), None);
    }
}
