//! Repository traits and their implementations.
//!
//! Services reach storage only through these traits. Two backends are provided:
//!
//! - [`MemoryStore`]: tables in a `RwLock`, lost on exit. Used by tests and by the server when
//!   no data directory is configured.
//! - [`YamlStore`]: the same tables, loaded from and rewritten to a single YAML file after every
//!   mutation.
//!
//! Uniqueness rules (national id, username, one dose per patient and vaccine) are enforced inside
//! the insert and update methods, under the store's write lock, so two concurrent requests cannot
//! both pass a check-then-insert.

pub mod memory;
pub mod yaml;

pub use memory::MemoryStore;
pub use yaml::YamlStore;

use crate::config::CoreConfig;
use crate::model::{
    Doctor, DoctorId, Immunization, ImmunizationId, NewPatient, NewVaccine, Patient, PatientId,
    Vaccine, VaccineId,
};
use crate::VaxResult;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use vax_types::{NationalId, NonEmptyText};

/// Catalog storage.
pub trait VaccineRepository {
    /// All vaccines in catalog order (ascending id).
    fn list_vaccines(&self) -> VaxResult<Vec<Vaccine>>;

    fn get_vaccine(&self, id: VaccineId) -> VaxResult<Option<Vaccine>>;

    fn insert_vaccine(&self, new: NewVaccine) -> VaxResult<Vaccine>;

    /// Deletes a vaccine. Fails with `VaccineInUse` while immunizations reference it.
    ///
    /// Returns `false` if no such vaccine existed.
    fn delete_vaccine(&self, id: VaccineId) -> VaxResult<bool>;
}

pub trait PatientRepository {
    fn list_patients(&self) -> VaxResult<Vec<Patient>>;

    fn patients_for_doctor(&self, doctor_id: DoctorId) -> VaxResult<Vec<Patient>>;

    fn get_patient(&self, id: PatientId) -> VaxResult<Option<Patient>>;

    fn find_patient_by_national_id(&self, national_id: &NationalId) -> VaxResult<Option<Patient>>;

    /// Inserts a patient owned by `doctor_id`. Fails with `DuplicateNationalId` if another
    /// patient already has the same national id.
    fn insert_patient(&self, doctor_id: DoctorId, new: NewPatient) -> VaxResult<Patient>;

    /// Replaces a stored patient. Fails with `DuplicateNationalId` if a different patient has the
    /// new national id; returns `false` if the patient does not exist.
    fn update_patient(&self, patient: Patient) -> VaxResult<bool>;

    /// Deletes a patient together with its immunizations. Returns `false` if absent.
    fn delete_patient(&self, id: PatientId) -> VaxResult<bool>;
}

/// Fields of a dose as written by the immunization service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmunizationRecord {
    pub patient_id: PatientId,
    pub vaccine_id: VaccineId,
    pub date_given: NaiveDate,
    pub doctor_id: DoctorId,
    pub created_at: DateTime<Utc>,
}

pub trait ImmunizationRepository {
    /// Doses recorded for one patient, in recording order.
    fn immunizations_for_patient(&self, patient_id: PatientId) -> VaxResult<Vec<Immunization>>;

    fn get_immunization(&self, id: ImmunizationId) -> VaxResult<Option<Immunization>>;

    /// Inserts a dose. Fails with `AlreadyAdministered` if the patient already has a dose of the
    /// same vaccine.
    fn insert_immunization(&self, record: ImmunizationRecord) -> VaxResult<Immunization>;

    /// Returns `false` if no such immunization existed.
    fn delete_immunization(&self, id: ImmunizationId) -> VaxResult<bool>;

    /// The ids of every vaccine recorded for `patient_id`.
    fn administered_vaccine_ids(&self, patient_id: PatientId) -> VaxResult<HashSet<VaccineId>> {
        Ok(self
            .immunizations_for_patient(patient_id)?
            .into_iter()
            .map(|imm| imm.vaccine_id)
            .collect())
    }
}

pub trait DoctorRepository {
    fn get_doctor(&self, id: DoctorId) -> VaxResult<Option<Doctor>>;

    fn find_doctor_by_username(&self, username: &str) -> VaxResult<Option<Doctor>>;

    /// Inserts an account. Fails with `DuplicateUsername` if the username is taken.
    fn insert_doctor(&self, username: NonEmptyText, password_hash: String) -> VaxResult<Doctor>;
}

/// Everything the services need from a backend.
pub trait Store:
    VaccineRepository + PatientRepository + ImmunizationRepository + DoctorRepository + Send + Sync
{
}

impl<T> Store for T where
    T: VaccineRepository
        + PatientRepository
        + ImmunizationRepository
        + DoctorRepository
        + Send
        + Sync
{
}

/// Opens the backend selected by `cfg`: the YAML store in the data directory when one is
/// configured, otherwise an empty in-memory store.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or the store file cannot be read.
pub fn open_store(cfg: &CoreConfig) -> VaxResult<Arc<dyn Store>> {
    match cfg.data_dir() {
        Some(dir) => {
            tracing::info!("using YAML store in {}", dir.display());
            Ok(Arc::new(YamlStore::open(dir)?))
        }
        None => {
            tracing::info!("using in-memory store; records are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
