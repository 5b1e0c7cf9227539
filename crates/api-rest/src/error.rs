use api_shared::ErrorRes;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use vax_core::VaxError;

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub VaxError);

impl From<VaxError> for ApiError {
    fn from(err: VaxError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(VaxError::InvalidInput(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            VaxError::InvalidInput(_) | VaxError::Text(_) => StatusCode::BAD_REQUEST,
            VaxError::InvalidCredentials | VaxError::InvalidSession => StatusCode::UNAUTHORIZED,
            VaxError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            VaxError::PatientNotFound(_)
            | VaxError::VaccineNotFound(_)
            | VaxError::ImmunizationNotFound(_)
            | VaxError::DoctorNotFound(_) => StatusCode::NOT_FOUND,
            VaxError::DuplicateNationalId(_)
            | VaxError::DuplicateUsername(_)
            | VaxError::AlreadyAdministered { .. }
            | VaxError::VaccineInUse(_) => StatusCode::CONFLICT,
            VaxError::PasswordHash(_)
            | VaxError::StorageDirCreation(_)
            | VaxError::FileRead(_)
            | VaxError::FileWrite(_)
            | VaxError::YamlSerialization(_)
            | VaxError::YamlDeserialization(_)
            | VaxError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {:?}", self.0);
            "Internal error".to_string()
        } else {
            self.0.to_string()
        };

        let mut response = (status, Json(ErrorRes { error })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
