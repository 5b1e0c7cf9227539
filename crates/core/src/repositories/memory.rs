//! In-memory store.

use super::{
    DoctorRepository, ImmunizationRecord, ImmunizationRepository, PatientRepository,
    VaccineRepository,
};
use crate::model::{
    Doctor, DoctorId, Immunization, ImmunizationId, NewPatient, NewVaccine, Patient, PatientId,
    Vaccine, VaccineId,
};
use crate::{VaxError, VaxResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use vax_types::{NationalId, NonEmptyText};

/// Last allocated id per table. Ids are never reused, even after deletes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Sequences {
    pub vaccine: i64,
    pub patient: i64,
    pub immunization: i64,
    pub doctor: i64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Tables {
    pub sequences: Sequences,
    pub vaccines: BTreeMap<VaccineId, Vaccine>,
    pub patients: BTreeMap<PatientId, Patient>,
    pub immunizations: BTreeMap<ImmunizationId, Immunization>,
    pub doctors: BTreeMap<DoctorId, Doctor>,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Store backed by in-process tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// A copy of the current tables.
    pub(crate) fn snapshot(&self) -> VaxResult<Tables> {
        Ok(self.read()?.clone())
    }

    /// Swaps in `tables` wholesale.
    pub(crate) fn replace_tables(&self, tables: Tables) -> VaxResult<()> {
        *self.write()? = tables;
        Ok(())
    }

    pub(crate) fn into_tables(self) -> VaxResult<Tables> {
        self.tables.into_inner().map_err(|_| VaxError::LockPoisoned)
    }

    fn read(&self) -> VaxResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| VaxError::LockPoisoned)
    }

    fn write(&self) -> VaxResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| VaxError::LockPoisoned)
    }
}

impl VaccineRepository for MemoryStore {
    fn list_vaccines(&self) -> VaxResult<Vec<Vaccine>> {
        Ok(self.read()?.vaccines.values().cloned().collect())
    }

    fn get_vaccine(&self, id: VaccineId) -> VaxResult<Option<Vaccine>> {
        Ok(self.read()?.vaccines.get(&id).cloned())
    }

    fn insert_vaccine(&self, new: NewVaccine) -> VaxResult<Vaccine> {
        let mut tables = self.write()?;
        let id = VaccineId(next(&mut tables.sequences.vaccine));
        let vaccine = Vaccine {
            id,
            name: new.name,
            is_mandatory: new.is_mandatory,
            recommended_month: new.recommended_month,
        };
        tables.vaccines.insert(id, vaccine.clone());
        Ok(vaccine)
    }

    fn delete_vaccine(&self, id: VaccineId) -> VaxResult<bool> {
        let mut tables = self.write()?;
        if !tables.vaccines.contains_key(&id) {
            return Ok(false);
        }
        if tables.immunizations.values().any(|imm| imm.vaccine_id == id) {
            return Err(VaxError::VaccineInUse(id));
        }
        tables.vaccines.remove(&id);
        Ok(true)
    }
}

impl PatientRepository for MemoryStore {
    fn list_patients(&self) -> VaxResult<Vec<Patient>> {
        Ok(self.read()?.patients.values().cloned().collect())
    }

    fn patients_for_doctor(&self, doctor_id: DoctorId) -> VaxResult<Vec<Patient>> {
        Ok(self
            .read()?
            .patients
            .values()
            .filter(|p| p.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    fn get_patient(&self, id: PatientId) -> VaxResult<Option<Patient>> {
        Ok(self.read()?.patients.get(&id).cloned())
    }

    fn find_patient_by_national_id(&self, national_id: &NationalId) -> VaxResult<Option<Patient>> {
        Ok(self
            .read()?
            .patients
            .values()
            .find(|p| &p.national_id == national_id)
            .cloned())
    }

    fn insert_patient(&self, doctor_id: DoctorId, new: NewPatient) -> VaxResult<Patient> {
        let mut tables = self.write()?;
        if tables
            .patients
            .values()
            .any(|p| p.national_id == new.national_id)
        {
            return Err(VaxError::DuplicateNationalId(new.national_id));
        }

        let id = PatientId(next(&mut tables.sequences.patient));
        let patient = Patient {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            national_id: new.national_id,
            birth_date: new.birth_date,
            doctor_id,
        };
        tables.patients.insert(id, patient.clone());
        Ok(patient)
    }

    fn update_patient(&self, patient: Patient) -> VaxResult<bool> {
        let mut tables = self.write()?;
        if !tables.patients.contains_key(&patient.id) {
            return Ok(false);
        }
        if tables
            .patients
            .values()
            .any(|p| p.id != patient.id && p.national_id == patient.national_id)
        {
            return Err(VaxError::DuplicateNationalId(patient.national_id));
        }
        tables.patients.insert(patient.id, patient);
        Ok(true)
    }

    fn delete_patient(&self, id: PatientId) -> VaxResult<bool> {
        let mut tables = self.write()?;
        if tables.patients.remove(&id).is_none() {
            return Ok(false);
        }
        tables.immunizations.retain(|_, imm| imm.patient_id != id);
        Ok(true)
    }
}

impl ImmunizationRepository for MemoryStore {
    fn immunizations_for_patient(&self, patient_id: PatientId) -> VaxResult<Vec<Immunization>> {
        Ok(self
            .read()?
            .immunizations
            .values()
            .filter(|imm| imm.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn get_immunization(&self, id: ImmunizationId) -> VaxResult<Option<Immunization>> {
        Ok(self.read()?.immunizations.get(&id).cloned())
    }

    fn insert_immunization(&self, record: ImmunizationRecord) -> VaxResult<Immunization> {
        let mut tables = self.write()?;
        if tables
            .immunizations
            .values()
            .any(|imm| imm.patient_id == record.patient_id && imm.vaccine_id == record.vaccine_id)
        {
            return Err(VaxError::AlreadyAdministered {
                patient: record.patient_id,
                vaccine: record.vaccine_id,
            });
        }

        let id = ImmunizationId(next(&mut tables.sequences.immunization));
        let immunization = Immunization {
            id,
            patient_id: record.patient_id,
            vaccine_id: record.vaccine_id,
            date_given: record.date_given,
            doctor_id: record.doctor_id,
            created_at: record.created_at,
        };
        tables.immunizations.insert(id, immunization.clone());
        Ok(immunization)
    }

    fn delete_immunization(&self, id: ImmunizationId) -> VaxResult<bool> {
        Ok(self.write()?.immunizations.remove(&id).is_some())
    }
}

impl DoctorRepository for MemoryStore {
    fn get_doctor(&self, id: DoctorId) -> VaxResult<Option<Doctor>> {
        Ok(self.read()?.doctors.get(&id).cloned())
    }

    fn find_doctor_by_username(&self, username: &str) -> VaxResult<Option<Doctor>> {
        Ok(self
            .read()?
            .doctors
            .values()
            .find(|d| d.username.as_str() == username)
            .cloned())
    }

    fn insert_doctor(&self, username: NonEmptyText, password_hash: String) -> VaxResult<Doctor> {
        let mut tables = self.write()?;
        if tables.doctors.values().any(|d| d.username == username) {
            return Err(VaxError::DuplicateUsername(username.into_inner()));
        }

        let id = DoctorId(next(&mut tables.sequences.doctor));
        let doctor = Doctor {
            id,
            username,
            password_hash,
        };
        tables.doctors.insert(id, doctor.clone());
        Ok(doctor)
    }
}
