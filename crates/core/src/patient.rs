//! Patient service.
//!
//! Every operation is scoped to the calling doctor: a doctor sees and changes only the patients
//! they own.

use crate::model::{DoctorId, NewPatient, Patient, PatientId};
use crate::repositories::Store;
use crate::{VaxError, VaxResult};
use std::sync::Arc;

/// Loads a patient and checks that `doctor_id` owns it.
///
/// # Errors
///
/// Returns `PatientNotFound` if the patient does not exist, `AccessDenied` if it belongs to
/// another doctor.
pub(crate) fn owned_patient(
    store: &dyn Store,
    doctor_id: DoctorId,
    patient_id: PatientId,
) -> VaxResult<Patient> {
    let patient = store
        .get_patient(patient_id)?
        .ok_or(VaxError::PatientNotFound(patient_id))?;

    if patient.doctor_id != doctor_id {
        tracing::warn!(
            doctor_id = %doctor_id,
            patient_id = %patient_id,
            "doctor attempted to access a patient they do not own"
        );
        return Err(VaxError::AccessDenied {
            doctor: doctor_id,
            patient: patient_id,
        });
    }

    Ok(patient)
}

/// Doctor-scoped patient operations.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn Store>,
}

impl PatientService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The patients owned by `doctor_id`, ordered by id.
    pub fn list_for_doctor(&self, doctor_id: DoctorId) -> VaxResult<Vec<Patient>> {
        self.store.patients_for_doctor(doctor_id)
    }

    /// Every patient in the store, regardless of owner. Used by administrative tooling.
    pub fn list_all(&self) -> VaxResult<Vec<Patient>> {
        self.store.list_patients()
    }

    /// # Errors
    ///
    /// Returns `PatientNotFound` or `AccessDenied`.
    pub fn get(&self, doctor_id: DoctorId, patient_id: PatientId) -> VaxResult<Patient> {
        owned_patient(self.store.as_ref(), doctor_id, patient_id)
    }

    /// Registers a patient under `doctor_id`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNationalId` if any patient, of any doctor, has the same national id.
    pub fn create(&self, doctor_id: DoctorId, new: NewPatient) -> VaxResult<Patient> {
        let patient = self.store.insert_patient(doctor_id, new)?;
        tracing::info!(
            patient_id = %patient.id,
            doctor_id = %doctor_id,
            "patient registered"
        );
        Ok(patient)
    }

    /// Replaces the demographic fields of an owned patient. Ownership does not change.
    ///
    /// # Errors
    ///
    /// Returns `PatientNotFound`, `AccessDenied`, or `DuplicateNationalId` when the new national
    /// id belongs to a different patient.
    pub fn update(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
        fields: NewPatient,
    ) -> VaxResult<Patient> {
        let current = owned_patient(self.store.as_ref(), doctor_id, patient_id)?;
        let updated = Patient {
            id: current.id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            national_id: fields.national_id,
            birth_date: fields.birth_date,
            doctor_id: current.doctor_id,
        };

        if !self.store.update_patient(updated.clone())? {
            return Err(VaxError::PatientNotFound(patient_id));
        }
        tracing::info!(patient_id = %patient_id, "patient updated");
        Ok(updated)
    }

    /// Deletes an owned patient and all of its recorded immunizations.
    ///
    /// # Errors
    ///
    /// Returns `PatientNotFound` or `AccessDenied`.
    pub fn delete(&self, doctor_id: DoctorId, patient_id: PatientId) -> VaxResult<()> {
        owned_patient(self.store.as_ref(), doctor_id, patient_id)?;
        if !self.store.delete_patient(patient_id)? {
            return Err(VaxError::PatientNotFound(patient_id));
        }
        tracing::info!(patient_id = %patient_id, "patient deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{ImmunizationRecord, ImmunizationRepository, MemoryStore, VaccineRepository};
    use crate::model::NewVaccine;
    use chrono::{NaiveDate, Utc};
    use vax_types::{NationalId, NonEmptyText};

    const OWNER: DoctorId = DoctorId(1);
    const OTHER: DoctorId = DoctorId(2);

    fn fields(national_id: &str, first: &str) -> NewPatient {
        NewPatient {
            first_name: NonEmptyText::new(first).unwrap(),
            last_name: NonEmptyText::new("Koleva").unwrap(),
            national_id: NationalId::parse(national_id).unwrap(),
            birth_date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        }
    }

    fn setup() -> (Arc<MemoryStore>, PatientService) {
        let store = Arc::new(MemoryStore::new());
        let service = PatientService::new(store.clone());
        (store, service)
    }

    #[test]
    fn test_list_is_scoped_to_owner() {
        let (_, service) = setup();
        service.create(OWNER, fields("100", "Ana")).unwrap();
        service.create(OTHER, fields("200", "Boris")).unwrap();

        let mine = service.list_for_doctor(OWNER).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].first_name.as_str(), "Ana");
        assert_eq!(service.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_get_other_doctors_patient_is_denied() {
        let (_, service) = setup();
        let patient = service.create(OWNER, fields("100", "Ana")).unwrap();

        let err = service
            .get(OTHER, patient.id)
            .expect_err("non-owner should be denied");
        assert!(matches!(err, VaxError::AccessDenied { .. }));

        let err = service
            .get(OWNER, PatientId(77))
            .expect_err("unknown patient should be reported");
        assert!(matches!(err, VaxError::PatientNotFound(PatientId(77))));
    }

    #[test]
    fn test_update_keeps_owner_and_checks_national_id() {
        let (_, service) = setup();
        let patient = service.create(OWNER, fields("100", "Ana")).unwrap();
        service.create(OWNER, fields("101", "Vera")).unwrap();

        let updated = service
            .update(OWNER, patient.id, fields("100", "Anna"))
            .expect("update with own national id should succeed");
        assert_eq!(updated.first_name.as_str(), "Anna");
        assert_eq!(updated.doctor_id, OWNER);

        let err = service
            .update(OWNER, patient.id, fields("101", "Anna"))
            .expect_err("taken national id should be rejected");
        assert!(matches!(err, VaxError::DuplicateNationalId(_)));

        let err = service
            .update(OTHER, patient.id, fields("100", "Anna"))
            .expect_err("non-owner should be denied");
        assert!(matches!(err, VaxError::AccessDenied { .. }));
    }

    #[test]
    fn test_delete_cascades_immunizations() {
        let (store, service) = setup();
        let patient = service.create(OWNER, fields("100", "Ana")).unwrap();
        let vaccine = store
            .insert_vaccine(NewVaccine {
                name: NonEmptyText::new("MMR").unwrap(),
                is_mandatory: true,
                recommended_month: Some(13),
            })
            .unwrap();
        store
            .insert_immunization(ImmunizationRecord {
                patient_id: patient.id,
                vaccine_id: vaccine.id,
                date_given: NaiveDate::from_ymd_opt(2025, 2, 9).unwrap(),
                doctor_id: OWNER,
                created_at: Utc::now(),
            })
            .unwrap();

        assert!(service.delete(OTHER, patient.id).is_err());
        service.delete(OWNER, patient.id).expect("owner can delete");

        assert!(store.immunizations_for_patient(patient.id).unwrap().is_empty());
        assert!(store.delete_vaccine(vaccine.id).unwrap());
    }
}
