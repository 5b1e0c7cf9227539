//! Recording and retracting administered doses.

use crate::clock::Clock;
use crate::model::{DoctorId, Immunization, ImmunizationId, NewImmunization, PatientId, Vaccine};
use crate::patient::owned_patient;
use crate::repositories::{ImmunizationRecord, Store};
use crate::{VaxError, VaxResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct ImmunizationService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl ImmunizationService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Records that a vaccine was given to one of the doctor's patients.
    ///
    /// The recording doctor becomes the dose's `doctor_id`; because the patient must be owned by
    /// that doctor, it always matches the patient's owner.
    ///
    /// # Errors
    ///
    /// Returns `VaxError` if:
    /// - the patient does not exist (`PatientNotFound`) or is not owned (`AccessDenied`),
    /// - the vaccine does not exist (`VaccineNotFound`),
    /// - the patient already has a dose of this vaccine (`AlreadyAdministered`).
    pub fn record(&self, doctor_id: DoctorId, new: NewImmunization) -> VaxResult<Immunization> {
        owned_patient(self.store.as_ref(), doctor_id, new.patient_id)?;

        if self.store.get_vaccine(new.vaccine_id)?.is_none() {
            return Err(VaxError::VaccineNotFound(new.vaccine_id));
        }

        let immunization = self.store.insert_immunization(ImmunizationRecord {
            patient_id: new.patient_id,
            vaccine_id: new.vaccine_id,
            date_given: new.date_given,
            doctor_id,
            created_at: self.clock.now(),
        })?;

        tracing::info!(
            immunization_id = %immunization.id,
            patient_id = %immunization.patient_id,
            vaccine_id = %immunization.vaccine_id,
            "dose recorded"
        );
        Ok(immunization)
    }

    /// Doses recorded for one of the doctor's patients.
    pub fn list_for_patient(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> VaxResult<Vec<Immunization>> {
        owned_patient(self.store.as_ref(), doctor_id, patient_id)?;
        self.store.immunizations_for_patient(patient_id)
    }

    /// Deletes a recorded dose.
    ///
    /// # Errors
    ///
    /// Returns `ImmunizationNotFound`, or `AccessDenied` when the dose belongs to a patient the
    /// doctor does not own.
    pub fn retract(&self, doctor_id: DoctorId, id: ImmunizationId) -> VaxResult<()> {
        let immunization = self
            .store
            .get_immunization(id)?
            .ok_or(VaxError::ImmunizationNotFound(id))?;
        owned_patient(self.store.as_ref(), doctor_id, immunization.patient_id)?;

        if !self.store.delete_immunization(id)? {
            return Err(VaxError::ImmunizationNotFound(id));
        }
        tracing::info!(immunization_id = %id, "dose retracted");
        Ok(())
    }

    /// Catalog vaccines not yet recorded for the patient, in catalog order.
    pub fn available_vaccines(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> VaxResult<Vec<Vaccine>> {
        owned_patient(self.store.as_ref(), doctor_id, patient_id)?;
        let administered = self.store.administered_vaccine_ids(patient_id)?;
        Ok(self
            .store
            .list_vaccines()?
            .into_iter()
            .filter(|v| !administered.contains(&v.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::{NewPatient, NewVaccine, Patient, VaccineId};
    use crate::repositories::{MemoryStore, PatientRepository, VaccineRepository};
    use chrono::{NaiveDate, TimeZone, Utc};
    use vax_types::{NationalId, NonEmptyText};

    const OWNER: DoctorId = DoctorId(1);
    const OTHER: DoctorId = DoctorId(2);

    struct Fixture {
        service: ImmunizationService,
        patient: Patient,
        vaccines: Vec<Vaccine>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        ));
        let patient = store
            .insert_patient(
                OWNER,
                NewPatient {
                    first_name: NonEmptyText::new("Petar").unwrap(),
                    last_name: NonEmptyText::new("Stoyanov").unwrap(),
                    national_id: NationalId::parse("2401010000").unwrap(),
                    birth_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                },
            )
            .unwrap();
        let vaccines = [("Hexavalent (1)", 2), ("Pneumococcal (1)", 2), ("MMR", 13)]
            .into_iter()
            .map(|(name, month)| {
                store
                    .insert_vaccine(NewVaccine {
                        name: NonEmptyText::new(name).unwrap(),
                        is_mandatory: true,
                        recommended_month: Some(month),
                    })
                    .unwrap()
            })
            .collect();

        Fixture {
            service: ImmunizationService::new(store, clock),
            patient,
            vaccines,
        }
    }

    fn dose(patient_id: PatientId, vaccine_id: VaccineId) -> NewImmunization {
        NewImmunization {
            patient_id,
            vaccine_id,
            date_given: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        }
    }

    #[test]
    fn test_record_sets_doctor_and_timestamp() {
        let f = fixture();
        let imm = f
            .service
            .record(OWNER, dose(f.patient.id, f.vaccines[0].id))
            .expect("owner can record a dose");

        assert_eq!(imm.doctor_id, OWNER);
        assert_eq!(imm.doctor_id, f.patient.doctor_id);
        assert_eq!(
            imm.created_at,
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_record_for_foreign_patient_is_denied() {
        let f = fixture();
        let err = f
            .service
            .record(OTHER, dose(f.patient.id, f.vaccines[0].id))
            .expect_err("non-owner should be denied");
        assert!(matches!(err, VaxError::AccessDenied { .. }));
    }

    #[test]
    fn test_record_unknown_vaccine() {
        let f = fixture();
        let err = f
            .service
            .record(OWNER, dose(f.patient.id, VaccineId(404)))
            .expect_err("unknown vaccine should be rejected");
        assert!(matches!(err, VaxError::VaccineNotFound(VaccineId(404))));
    }

    #[test]
    fn test_record_twice_is_rejected() {
        let f = fixture();
        f.service
            .record(OWNER, dose(f.patient.id, f.vaccines[2].id))
            .unwrap();
        let err = f
            .service
            .record(OWNER, dose(f.patient.id, f.vaccines[2].id))
            .expect_err("duplicate dose should be rejected");
        assert!(matches!(err, VaxError::AlreadyAdministered { .. }));
    }

    #[test]
    fn test_retract_then_record_again() {
        let f = fixture();
        let imm = f
            .service
            .record(OWNER, dose(f.patient.id, f.vaccines[1].id))
            .unwrap();

        let err = f
            .service
            .retract(OTHER, imm.id)
            .expect_err("non-owner cannot retract");
        assert!(matches!(err, VaxError::AccessDenied { .. }));

        f.service.retract(OWNER, imm.id).expect("owner can retract");
        assert!(f
            .service
            .list_for_patient(OWNER, f.patient.id)
            .unwrap()
            .is_empty());

        let err = f
            .service
            .retract(OWNER, imm.id)
            .expect_err("second retract should fail");
        assert!(matches!(err, VaxError::ImmunizationNotFound(_)));

        f.service
            .record(OWNER, dose(f.patient.id, f.vaccines[1].id))
            .expect("vaccine can be recorded again after retraction");
    }

    #[test]
    fn test_available_vaccines_excludes_recorded() {
        let f = fixture();
        f.service
            .record(OWNER, dose(f.patient.id, f.vaccines[0].id))
            .unwrap();

        let available: Vec<_> = f
            .service
            .available_vaccines(OWNER, f.patient.id)
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(available, vec![f.vaccines[1].id, f.vaccines[2].id]);
    }
}
