//! Domain records.
//!
//! Identifiers are integer newtypes allocated by the store. Records are plain values: the
//! services validate them once at the boundary and the store keeps them as given.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use vax_types::{NationalId, NonEmptyText};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(
    /// Identifier of a catalog vaccine.
    VaccineId
);
record_id!(
    /// Identifier of a patient.
    PatientId
);
record_id!(
    /// Identifier of a recorded dose.
    ImmunizationId
);
record_id!(
    /// Identifier of a doctor account.
    DoctorId
);

/// A catalog entry of the vaccination schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: VaccineId,
    pub name: NonEmptyText,
    /// Whether the national schedule requires this vaccine.
    pub is_mandatory: bool,
    /// Months since birth at which the vaccine is conventionally given; `None` means no fixed
    /// schedule, and such a vaccine is never due.
    pub recommended_month: Option<i32>,
}

/// Input for adding a vaccine to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVaccine {
    pub name: NonEmptyText,
    pub is_mandatory: bool,
    pub recommended_month: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub national_id: NationalId,
    pub birth_date: NaiveDate,
    /// The doctor who owns this patient's record.
    pub doctor_id: DoctorId,
}

/// Demographic fields supplied when creating or updating a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub national_id: NationalId,
    pub birth_date: NaiveDate,
}

/// The fact that a vaccine was given to a patient on a date.
///
/// Immunizations are created and deleted but never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Immunization {
    pub id: ImmunizationId,
    pub patient_id: PatientId,
    pub vaccine_id: VaccineId,
    pub date_given: NaiveDate,
    /// The doctor who recorded the dose.
    pub doctor_id: DoctorId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImmunization {
    pub patient_id: PatientId,
    pub vaccine_id: VaccineId,
    pub date_given: NaiveDate,
}

/// A doctor account. `password_hash` is an Argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub username: NonEmptyText,
    pub password_hash: String,
}
