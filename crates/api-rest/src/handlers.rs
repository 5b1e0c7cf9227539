//! Request handlers.
//!
//! Handlers translate between JSON and core calls; every rule (ownership, uniqueness,
//! eligibility) is enforced in `vax-core`.

use crate::{ApiError, AppState, CurrentDoctor, JsonBody};
use api_shared::{
    auth::{clear_session_cookie, session_cookie},
    CredentialsReq, DoctorRes, ErrorRes, HealthRes, HealthService, ImmunizationReq, ImmunizationRes,
    PatientReq, PatientRes, ScheduleRes, TokenRes, VaccineReq, VaccineRes,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use vax_core::{ImmunizationId, NewPatient, NewVaccine, PatientId, VaccineId};

type ApiResult<T> = Result<T, ApiError>;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Requires no authentication.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = CredentialsReq,
    responses(
        (status = 201, description = "Doctor registered", body = DoctorRes),
        (status = 400, description = "Blank username or weak password", body = ErrorRes),
        (status = 409, description = "Username taken", body = ErrorRes)
    )
)]
/// Register a doctor account
#[axum::debug_handler]
pub(crate) async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CredentialsReq>,
) -> ApiResult<(StatusCode, Json<DoctorRes>)> {
    let doctor = state
        .services
        .accounts
        .register(&req.username, &req.password)?;
    Ok((StatusCode::CREATED, Json(doctor.into())))
}

#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = CredentialsReq,
    responses(
        (status = 200, description = "Session opened; the token is also set as the access_token cookie", body = TokenRes),
        (status = 401, description = "Invalid username or password", body = ErrorRes)
    )
)]
/// Log in and open a session
///
/// # Returns
/// * The bearer token and its expiry, plus a `Set-Cookie` header for browser clients
///
/// # Errors
/// Returns `401 Unauthorized` for an unknown username or a wrong password.
#[axum::debug_handler]
pub(crate) async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CredentialsReq>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .services
        .accounts
        .login(&req.username, &req.password)?;
    let cookie = session_cookie(&session.token, state.cookie_max_age());
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(TokenRes::from(session)),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Not authenticated", body = ErrorRes)
    )
)]
/// Close the current session and clear the cookie
#[axum::debug_handler]
pub(crate) async fn logout(
    State(state): State<AppState>,
    current: CurrentDoctor,
) -> ApiResult<impl IntoResponse> {
    state.services.accounts.logout(&current.token)?;
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    ))
}

#[utoipa::path(
    get,
    path = "/doctors/me",
    responses(
        (status = 200, description = "The logged-in doctor", body = DoctorRes),
        (status = 401, description = "Not authenticated", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn me(State(_state): State<AppState>, current: CurrentDoctor) -> Json<DoctorRes> {
    Json(current.doctor.into())
}

#[utoipa::path(
    get,
    path = "/vaccines",
    responses(
        (status = 200, description = "The vaccine catalog", body = [VaccineRes]),
        (status = 401, description = "Not authenticated", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_vaccines(
    State(state): State<AppState>,
    _current: CurrentDoctor,
) -> ApiResult<Json<Vec<VaccineRes>>> {
    let vaccines = state.services.catalog.list()?;
    Ok(Json(vaccines.into_iter().map(VaccineRes::from).collect()))
}

#[utoipa::path(
    post,
    path = "/vaccines",
    request_body = VaccineReq,
    responses(
        (status = 201, description = "Vaccine added", body = VaccineRes),
        (status = 400, description = "Blank name or month out of range", body = ErrorRes),
        (status = 401, description = "Not authenticated", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn create_vaccine(
    State(state): State<AppState>,
    _current: CurrentDoctor,
    JsonBody(req): JsonBody<VaccineReq>,
) -> ApiResult<(StatusCode, Json<VaccineRes>)> {
    let vaccine = state.services.catalog.create(NewVaccine::try_from(req)?)?;
    Ok((StatusCode::CREATED, Json(vaccine.into())))
}

#[utoipa::path(
    delete,
    path = "/vaccines/{id}",
    params(("id" = i64, Path, description = "Vaccine id")),
    responses(
        (status = 204, description = "Vaccine deleted"),
        (status = 404, description = "Unknown vaccine", body = ErrorRes),
        (status = 409, description = "Vaccine has recorded immunizations", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_vaccine(
    State(state): State<AppState>,
    _current: CurrentDoctor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.services.catalog.delete(VaccineId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Patients of the logged-in doctor", body = [PatientRes]),
        (status = 401, description = "Not authenticated", body = ErrorRes)
    )
)]
/// List the logged-in doctor's patients
#[axum::debug_handler]
pub(crate) async fn list_patients(
    State(state): State<AppState>,
    current: CurrentDoctor,
) -> ApiResult<Json<Vec<PatientRes>>> {
    let patients = state.services.patients.list_for_doctor(current.doctor.id)?;
    Ok(Json(patients.into_iter().map(PatientRes::from).collect()))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 409, description = "National id already registered", body = ErrorRes)
    )
)]
/// Register a patient under the logged-in doctor
#[axum::debug_handler]
pub(crate) async fn create_patient(
    State(state): State<AppState>,
    current: CurrentDoctor,
    JsonBody(req): JsonBody<PatientReq>,
) -> ApiResult<(StatusCode, Json<PatientRes>)> {
    let patient = state
        .services
        .patients
        .create(current.doctor.id, NewPatient::try_from(req)?)?;
    Ok((StatusCode::CREATED, Json(patient.into())))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient", body = PatientRes),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    current: CurrentDoctor,
    Path(id): Path<i64>,
) -> ApiResult<Json<PatientRes>> {
    let patient = state
        .services
        .patients
        .get(current.doctor.id, PatientId(id))?;
    Ok(Json(patient.into()))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = PatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 409, description = "National id already registered", body = ErrorRes)
    )
)]
/// Replace a patient's demographics
#[axum::debug_handler]
pub(crate) async fn update_patient(
    State(state): State<AppState>,
    current: CurrentDoctor,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<PatientReq>,
) -> ApiResult<Json<PatientRes>> {
    let patient = state.services.patients.update(
        current.doctor.id,
        PatientId(id),
        NewPatient::try_from(req)?,
    )?;
    Ok(Json(patient.into()))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient and its immunizations deleted"),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_patient(
    State(state): State<AppState>,
    current: CurrentDoctor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .services
        .patients
        .delete(current.doctor.id, PatientId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/patients/{id}/available-vaccines",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Catalog vaccines not yet recorded for the patient", body = [VaccineRes]),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn available_vaccines(
    State(state): State<AppState>,
    current: CurrentDoctor,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<VaccineRes>>> {
    let vaccines = state
        .services
        .immunizations
        .available_vaccines(current.doctor.id, PatientId(id))?;
    Ok(Json(vaccines.into_iter().map(VaccineRes::from).collect()))
}

#[utoipa::path(
    post,
    path = "/immunizations",
    request_body = ImmunizationReq,
    responses(
        (status = 201, description = "Dose recorded", body = ImmunizationRes),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown patient or vaccine", body = ErrorRes),
        (status = 409, description = "Vaccine already recorded for the patient", body = ErrorRes)
    )
)]
/// Record an administered dose
///
/// The logged-in doctor is recorded as the administering doctor.
#[axum::debug_handler]
pub(crate) async fn record_immunization(
    State(state): State<AppState>,
    current: CurrentDoctor,
    JsonBody(req): JsonBody<ImmunizationReq>,
) -> ApiResult<(StatusCode, Json<ImmunizationRes>)> {
    let immunization = state
        .services
        .immunizations
        .record(current.doctor.id, req.into())?;
    Ok((StatusCode::CREATED, Json(immunization.into())))
}

#[utoipa::path(
    get,
    path = "/immunizations/patient/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Doses recorded for the patient", body = [ImmunizationRes]),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_immunizations(
    State(state): State<AppState>,
    current: CurrentDoctor,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<ImmunizationRes>>> {
    let immunizations = state
        .services
        .immunizations
        .list_for_patient(current.doctor.id, PatientId(id))?;
    Ok(Json(
        immunizations
            .into_iter()
            .map(ImmunizationRes::from)
            .collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/immunizations/{id}",
    params(("id" = i64, Path, description = "Immunization id")),
    responses(
        (status = 204, description = "Dose retracted"),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown immunization", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn retract_immunization(
    State(state): State<AppState>,
    current: CurrentDoctor,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .services
        .immunizations
        .retract(current.doctor.id, ImmunizationId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/schedule/{patient_id}",
    params(("patient_id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Given and missing mandatory vaccines for today", body = ScheduleRes),
        (status = 403, description = "Patient belongs to another doctor", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
/// Evaluate a patient's vaccination schedule
///
/// Computes the patient's age in whole months as of today, selects the mandatory vaccines
/// required at that age, and splits them into given and missing.
#[axum::debug_handler]
pub(crate) async fn patient_schedule(
    State(state): State<AppState>,
    current: CurrentDoctor,
    Path(patient_id): Path<i64>,
) -> ApiResult<Json<ScheduleRes>> {
    let schedule = state
        .services
        .schedule
        .for_patient(current.doctor.id, PatientId(patient_id))?;
    Ok(Json(schedule.into()))
}
