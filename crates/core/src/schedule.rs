//! Per-patient schedule evaluation.
//!
//! Glues the age calculator and the eligibility engine to the store: fetch the patient, the
//! catalog and the administered set, then evaluate against the clock's "today".

use crate::age::age_in_months;
use crate::clock::Clock;
use crate::eligibility::{evaluate, required_mandatory_vaccines};
use crate::model::{DoctorId, Patient, PatientId, Vaccine};
use crate::patient::owned_patient;
use crate::repositories::Store;
use crate::VaxResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

/// The schedule of one patient on the evaluation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientSchedule {
    pub patient: Patient,
    pub evaluated_on: NaiveDate,
    pub age_months: i32,
    /// Catalog vaccines recorded for the patient, required or not.
    pub administered: Vec<Vaccine>,
    /// Required vaccines already recorded.
    pub given: Vec<Vaccine>,
    /// Required vaccines not yet recorded.
    pub missing: Vec<Vaccine>,
}

/// The required vaccines for a birth date, without any recorded doses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulePreview {
    pub birth_date: NaiveDate,
    pub evaluated_on: NaiveDate,
    pub age_months: i32,
    pub required: Vec<Vaccine>,
}

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Evaluates the schedule of an owned patient as of today.
    ///
    /// # Errors
    ///
    /// Returns `PatientNotFound` or `AccessDenied`, or a storage error.
    pub fn for_patient(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> VaxResult<PatientSchedule> {
        let patient = owned_patient(self.store.as_ref(), doctor_id, patient_id)?;
        let catalog = self.store.list_vaccines()?;
        let administered = self.store.administered_vaccine_ids(patient_id)?;

        let today = self.clock.today();
        let age_months = age_in_months(patient.birth_date, today);
        let status = evaluate(age_months, &catalog, &administered);

        tracing::debug!(
            patient_id = %patient_id,
            age_months,
            missing = status.missing.len(),
            "schedule evaluated"
        );

        Ok(PatientSchedule {
            evaluated_on: today,
            age_months,
            administered: status.administered.into_iter().cloned().collect(),
            given: status.given.into_iter().cloned().collect(),
            missing: status.missing.into_iter().cloned().collect(),
            patient,
        })
    }

    /// Required vaccines for a child born on `birth_date`, evaluated on `on` or today.
    pub fn preview(
        &self,
        birth_date: NaiveDate,
        on: Option<NaiveDate>,
    ) -> VaxResult<SchedulePreview> {
        let evaluated_on = on.unwrap_or_else(|| self.clock.today());
        let age_months = age_in_months(birth_date, evaluated_on);
        let catalog = self.store.list_vaccines()?;
        let required = required_mandatory_vaccines(age_months, &catalog)
            .into_iter()
            .cloned()
            .collect();

        Ok(SchedulePreview {
            birth_date,
            evaluated_on,
            age_months,
            required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::clock::FixedClock;
    use crate::model::{NewImmunization, NewPatient};
    use crate::immunization::ImmunizationService;
    use crate::patient::PatientService;
    use crate::repositories::MemoryStore;
    use crate::VaxError;
    use vax_types::{NationalId, NonEmptyText};

    const OWNER: DoctorId = DoctorId(1);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        schedule: ScheduleService,
        immunizations: ImmunizationService,
        patient: Patient,
        catalog: Vec<Vaccine>,
    }

    fn fixture(birth_date: NaiveDate, today: NaiveDate) -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(today));

        let catalog = CatalogService::new(store.clone());
        catalog.seed_national_schedule().unwrap();

        let patient = PatientService::new(store.clone())
            .create(
                OWNER,
                NewPatient {
                    first_name: NonEmptyText::new("Mila").unwrap(),
                    last_name: NonEmptyText::new("Ivanova").unwrap(),
                    national_id: NationalId::parse("P-001").unwrap(),
                    birth_date,
                },
            )
            .unwrap();

        Fixture {
            schedule: ScheduleService::new(store.clone(), clock.clone()),
            immunizations: ImmunizationService::new(store, clock),
            patient,
            catalog: catalog.list().unwrap(),
        }
    }

    fn names(vaccines: &[Vaccine]) -> Vec<&str> {
        vaccines.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_four_month_old_with_two_month_doses() {
        let f = fixture(date(2024, 1, 15), date(2024, 5, 20));
        for vaccine in f
            .catalog
            .iter()
            .filter(|v| v.recommended_month == Some(2) && v.is_mandatory)
        {
            f.immunizations
                .record(
                    OWNER,
                    NewImmunization {
                        patient_id: f.patient.id,
                        vaccine_id: vaccine.id,
                        date_given: date(2024, 3, 16),
                    },
                )
                .unwrap();
        }

        let schedule = f.schedule.for_patient(OWNER, f.patient.id).unwrap();
        assert_eq!(schedule.age_months, 4);
        assert_eq!(schedule.evaluated_on, date(2024, 5, 20));
        assert_eq!(
            names(&schedule.given),
            vec!["Hexavalent (1)", "Pneumococcal (1)"]
        );
        assert_eq!(
            names(&schedule.missing),
            vec!["Hexavalent (2)", "Hexavalent (3)", "Pneumococcal (2)"]
        );
    }

    #[test]
    fn test_band_hides_recorded_early_dose_from_given() {
        let f = fixture(date(2023, 1, 10), date(2024, 9, 10));
        let mmr = f
            .catalog
            .iter()
            .find(|v| v.name.as_str() == "MMR")
            .unwrap();
        f.immunizations
            .record(
                OWNER,
                NewImmunization {
                    patient_id: f.patient.id,
                    vaccine_id: mmr.id,
                    date_given: date(2024, 2, 12),
                },
            )
            .unwrap();

        let schedule = f.schedule.for_patient(OWNER, f.patient.id).unwrap();
        assert_eq!(schedule.age_months, 20);
        assert!(schedule.given.is_empty());
        assert_eq!(names(&schedule.administered), vec!["MMR"]);
        assert_eq!(
            names(&schedule.missing),
            vec!["Pneumococcal (booster)", "Pentavalent (booster)"]
        );
    }

    #[test]
    fn test_schedule_of_foreign_patient_is_denied() {
        let f = fixture(date(2024, 1, 15), date(2024, 5, 20));
        let err = f
            .schedule
            .for_patient(DoctorId(99), f.patient.id)
            .expect_err("non-owner should be denied");
        assert!(matches!(err, VaxError::AccessDenied { .. }));
    }

    #[test]
    fn test_preview_uses_given_reference_date() {
        let f = fixture(date(2024, 1, 15), date(2024, 5, 20));
        let preview = f
            .schedule
            .preview(date(2020, 1, 1), Some(date(2022, 6, 1)))
            .unwrap();

        assert_eq!(preview.age_months, 29);
        assert_eq!(preview.required.len(), 8);
        assert!(preview.required.iter().all(|v| v.is_mandatory));
    }

    #[test]
    fn test_preview_defaults_to_clock_today() {
        let f = fixture(date(2024, 1, 15), date(2024, 5, 20));
        let preview = f.schedule.preview(date(2024, 5, 1), None).unwrap();
        assert_eq!(preview.evaluated_on, date(2024, 5, 20));
        assert_eq!(preview.age_months, 0);
        assert!(preview.required.is_empty());
    }
}
