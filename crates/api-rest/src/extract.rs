use crate::{ApiError, AppState};
use api_shared::auth::session_token;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts},
};
use vax_core::{Doctor, VaxError};

/// The doctor behind the request's session token.
///
/// Rejects with `401` when no token is present or the session is unknown or expired.
pub struct CurrentDoctor {
    pub doctor: Doctor,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentDoctor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let cookie = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok());

        let token = session_token(authorization, cookie).ok_or(VaxError::InvalidSession)?;
        let doctor = state.services.accounts.authenticate(token)?;

        Ok(Self {
            doctor,
            token: token.to_owned(),
        })
    }
}

/// A JSON request body.
///
/// Same as `axum::Json`, but a malformed body, a wrong content type or a field that fails to
/// deserialize is answered with `400` and an `{"error"}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
