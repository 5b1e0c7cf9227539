//! Request and response bodies.
//!
//! These are the JSON shapes of the public API. Core models convert into response types with
//! `From`; request types convert into core inputs with `TryFrom`, which is where free-form text
//! is validated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vax_core::{
    Doctor, Immunization, NationalId, NewImmunization, NewPatient, NewVaccine, NonEmptyText,
    Patient, PatientId, PatientSchedule, Session, Vaccine, VaccineId, VaxError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// Credentials, used both to register and to log in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenRes {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for TokenRes {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.token,
            token_type: "bearer".into(),
            expires_at: session.expires_at,
        }
    }
}

/// A doctor as seen by clients. The password hash never leaves the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DoctorRes {
    pub id: i64,
    pub username: String,
}

impl From<Doctor> for DoctorRes {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id.0,
            username: doctor.username.into_inner(),
        }
    }
}

fn default_mandatory() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VaccineReq {
    pub name: String,
    /// Defaults to `true` when omitted.
    #[serde(default = "default_mandatory")]
    pub is_mandatory: bool,
    #[serde(default)]
    pub recommended_month: Option<i32>,
}

impl TryFrom<VaccineReq> for NewVaccine {
    type Error = VaxError;

    fn try_from(req: VaccineReq) -> Result<Self, Self::Error> {
        Ok(Self {
            name: NonEmptyText::new(&req.name)?,
            is_mandatory: req.is_mandatory,
            recommended_month: req.recommended_month,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VaccineRes {
    pub id: i64,
    pub name: String,
    pub is_mandatory: bool,
    pub recommended_month: Option<i32>,
}

impl From<Vaccine> for VaccineRes {
    fn from(vaccine: Vaccine) -> Self {
        Self {
            id: vaccine.id.0,
            name: vaccine.name.into_inner(),
            is_mandatory: vaccine.is_mandatory,
            recommended_month: vaccine.recommended_month,
        }
    }
}

/// Patient demographics, for both creation and full update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientReq {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
}

impl TryFrom<PatientReq> for NewPatient {
    type Error = VaxError;

    fn try_from(req: PatientReq) -> Result<Self, Self::Error> {
        Ok(Self {
            first_name: NonEmptyText::new(&req.first_name)?,
            last_name: NonEmptyText::new(&req.last_name)?,
            national_id: NationalId::parse(&req.national_id)?,
            birth_date: req.birth_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub doctor_id: i64,
}

impl From<Patient> for PatientRes {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.0,
            first_name: patient.first_name.into_inner(),
            last_name: patient.last_name.into_inner(),
            national_id: patient.national_id.as_str().to_owned(),
            birth_date: patient.birth_date,
            doctor_id: patient.doctor_id.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImmunizationReq {
    pub patient_id: i64,
    pub vaccine_id: i64,
    pub date_given: NaiveDate,
}

impl From<ImmunizationReq> for NewImmunization {
    fn from(req: ImmunizationReq) -> Self {
        Self {
            patient_id: PatientId(req.patient_id),
            vaccine_id: VaccineId(req.vaccine_id),
            date_given: req.date_given,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImmunizationRes {
    pub id: i64,
    pub patient_id: i64,
    pub vaccine_id: i64,
    pub date_given: NaiveDate,
    pub doctor_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Immunization> for ImmunizationRes {
    fn from(imm: Immunization) -> Self {
        Self {
            id: imm.id.0,
            patient_id: imm.patient_id.0,
            vaccine_id: imm.vaccine_id.0,
            date_given: imm.date_given,
            doctor_id: imm.doctor_id.0,
            created_at: imm.created_at,
        }
    }
}

/// A patient's schedule on `evaluated_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleRes {
    pub patient: PatientRes,
    pub evaluated_on: NaiveDate,
    pub age_months: i32,
    /// Every catalog vaccine recorded for the patient.
    pub administered: Vec<VaccineRes>,
    /// Required vaccines already recorded.
    pub given: Vec<VaccineRes>,
    /// Required vaccines still to be given.
    pub missing: Vec<VaccineRes>,
}

fn into_res(vaccines: Vec<Vaccine>) -> Vec<VaccineRes> {
    vaccines.into_iter().map(VaccineRes::from).collect()
}

impl From<PatientSchedule> for ScheduleRes {
    fn from(schedule: PatientSchedule) -> Self {
        Self {
            patient: schedule.patient.into(),
            evaluated_on: schedule.evaluated_on,
            age_months: schedule.age_months,
            administered: into_res(schedule.administered),
            given: into_res(schedule.given),
            missing: into_res(schedule.missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vax_core::{DoctorId, TextError};

    #[test]
    fn test_vaccine_req_defaults_to_mandatory() {
        let req: VaccineReq =
            serde_json::from_str(r#"{"name": "MMR"}"#).expect("minimal body should parse");
        assert!(req.is_mandatory);
        assert_eq!(req.recommended_month, None);
    }

    #[test]
    fn test_patient_req_rejects_blank_names() {
        let req = PatientReq {
            first_name: "  ".into(),
            last_name: "Petrova".into(),
            national_id: "0141010001".into(),
            birth_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let err = NewPatient::try_from(req).expect_err("blank first name should fail");
        assert!(matches!(err, VaxError::Text(TextError::Empty)));
    }

    #[test]
    fn test_doctor_res_hides_password_hash() {
        let doctor = Doctor {
            id: DoctorId(3),
            username: NonEmptyText::new("dr.petrova").unwrap(),
            password_hash: "$argon2id$secret".into(),
        };
        let json = serde_json::to_string(&DoctorRes::from(doctor)).unwrap();
        assert_eq!(json, r#"{"id":3,"username":"dr.petrova"}"#);
    }

    #[test]
    fn test_token_res_is_bearer() {
        let res = TokenRes::from(Session {
            token: "abc".into(),
            doctor_id: DoctorId(1),
            expires_at: Utc::now(),
        });
        assert_eq!(res.token_type, "bearer");
        assert_eq!(res.access_token, "abc");
    }
}
