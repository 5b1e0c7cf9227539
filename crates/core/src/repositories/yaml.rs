//! YAML file backed store.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//!   records.yaml       # every table, rewritten after each mutation
//!   records.yaml.tmp   # transient, renamed over records.yaml
//! ```
//!
//! Reads are served from memory. Each mutation runs under a file lock against a staged copy of
//! the tables; the copy replaces the file through a temp file and rename and only then becomes
//! visible in memory, so readers never see a change that did not reach disk.

use super::memory::{MemoryStore, Sequences, Tables};
use super::{
    DoctorRepository, ImmunizationRecord, ImmunizationRepository, PatientRepository,
    VaccineRepository,
};
use crate::constants::STORE_FILENAME;
use crate::model::{
    Doctor, DoctorId, Immunization, ImmunizationId, NewPatient, NewVaccine, Patient, PatientId,
    Vaccine, VaccineId,
};
use crate::{VaxError, VaxResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use vax_types::{NationalId, NonEmptyText};

/// On-disk shape of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    sequences: Sequences,
    #[serde(default)]
    vaccines: Vec<Vaccine>,
    #[serde(default)]
    doctors: Vec<Doctor>,
    #[serde(default)]
    patients: Vec<Patient>,
    #[serde(default)]
    immunizations: Vec<Immunization>,
}

impl From<&Tables> for StoreFile {
    fn from(tables: &Tables) -> Self {
        Self {
            sequences: tables.sequences.clone(),
            vaccines: tables.vaccines.values().cloned().collect(),
            doctors: tables.doctors.values().cloned().collect(),
            patients: tables.patients.values().cloned().collect(),
            immunizations: tables.immunizations.values().cloned().collect(),
        }
    }
}

impl From<StoreFile> for Tables {
    fn from(file: StoreFile) -> Self {
        let mut tables = Tables {
            sequences: file.sequences,
            vaccines: file.vaccines.into_iter().map(|v| (v.id, v)).collect(),
            doctors: file.doctors.into_iter().map(|d| (d.id, d)).collect(),
            patients: file.patients.into_iter().map(|p| (p.id, p)).collect(),
            immunizations: file.immunizations.into_iter().map(|i| (i.id, i)).collect(),
        };

        // A hand-edited file may carry ids beyond its sequences; never hand those out again.
        let seq = &mut tables.sequences;
        seq.vaccine = seq.vaccine.max(last_key(tables.vaccines.keys().map(|id| id.0)));
        seq.doctor = seq.doctor.max(last_key(tables.doctors.keys().map(|id| id.0)));
        seq.patient = seq.patient.max(last_key(tables.patients.keys().map(|id| id.0)));
        seq.immunization = seq
            .immunization
            .max(last_key(tables.immunizations.keys().map(|id| id.0)));

        tables
    }
}

fn last_key(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0)
}

/// Store persisted to `<data_dir>/records.yaml`.
#[derive(Debug)]
pub struct YamlStore {
    path: PathBuf,
    inner: MemoryStore,
    file_lock: Mutex<()>,
}

impl YamlStore {
    /// Opens the store in `data_dir`, creating the directory if needed.
    ///
    /// A missing store file yields an empty store; the file is first written on the first
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns `VaxError` if:
    /// - the directory cannot be created (`StorageDirCreation`),
    /// - the store file exists but cannot be read (`FileRead`) or parsed (`YamlDeserialization`).
    pub fn open(data_dir: &Path) -> VaxResult<Self> {
        fs::create_dir_all(data_dir).map_err(VaxError::StorageDirCreation)?;
        let path = data_dir.join(STORE_FILENAME);

        let tables = if path.is_file() {
            let raw = fs::read_to_string(&path).map_err(VaxError::FileRead)?;
            let file: StoreFile =
                serde_yaml::from_str(&raw).map_err(VaxError::YamlDeserialization)?;
            tracing::debug!(
                "loaded {} vaccines, {} patients, {} immunizations from {}",
                file.vaccines.len(),
                file.patients.len(),
                file.immunizations.len(),
                path.display()
            );
            Tables::from(file)
        } else {
            Tables::default()
        };

        Ok(Self {
            path,
            inner: MemoryStore::from_tables(tables),
            file_lock: Mutex::new(()),
        })
    }

    /// Path of the YAML file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `op` to a staged copy of the tables and publishes it only once the file has been
    /// replaced. A failed operation or a failed write leaves both memory and disk unchanged.
    fn mutate<T>(&self, op: impl FnOnce(&MemoryStore) -> VaxResult<T>) -> VaxResult<T> {
        let _guard = self.file_lock.lock().map_err(|_| VaxError::LockPoisoned)?;
        let staged = MemoryStore::from_tables(self.inner.snapshot()?);
        let out = op(&staged)?;
        let tables = staged.into_tables()?;
        self.persist(&tables)?;
        self.inner.replace_tables(tables)?;
        Ok(out)
    }

    fn persist(&self, tables: &Tables) -> VaxResult<()> {
        let yaml =
            serde_yaml::to_string(&StoreFile::from(tables)).map_err(VaxError::YamlSerialization)?;

        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).map_err(|e| {
            tracing::error!("failed to write {}: {}", tmp.display(), e);
            VaxError::FileWrite(e)
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            tracing::error!("failed to replace {}: {}", self.path.display(), e);
            let _ = fs::remove_file(&tmp);
            VaxError::FileWrite(e)
        })
    }
}

impl VaccineRepository for YamlStore {
    fn list_vaccines(&self) -> VaxResult<Vec<Vaccine>> {
        self.inner.list_vaccines()
    }

    fn get_vaccine(&self, id: VaccineId) -> VaxResult<Option<Vaccine>> {
        self.inner.get_vaccine(id)
    }

    fn insert_vaccine(&self, new: NewVaccine) -> VaxResult<Vaccine> {
        self.mutate(|store| store.insert_vaccine(new))
    }

    fn delete_vaccine(&self, id: VaccineId) -> VaxResult<bool> {
        self.mutate(|store| store.delete_vaccine(id))
    }
}

impl PatientRepository for YamlStore {
    fn list_patients(&self) -> VaxResult<Vec<Patient>> {
        self.inner.list_patients()
    }

    fn patients_for_doctor(&self, doctor_id: DoctorId) -> VaxResult<Vec<Patient>> {
        self.inner.patients_for_doctor(doctor_id)
    }

    fn get_patient(&self, id: PatientId) -> VaxResult<Option<Patient>> {
        self.inner.get_patient(id)
    }

    fn find_patient_by_national_id(&self, national_id: &NationalId) -> VaxResult<Option<Patient>> {
        self.inner.find_patient_by_national_id(national_id)
    }

    fn insert_patient(&self, doctor_id: DoctorId, new: NewPatient) -> VaxResult<Patient> {
        self.mutate(|store| store.insert_patient(doctor_id, new))
    }

    fn update_patient(&self, patient: Patient) -> VaxResult<bool> {
        self.mutate(|store| store.update_patient(patient))
    }

    fn delete_patient(&self, id: PatientId) -> VaxResult<bool> {
        self.mutate(|store| store.delete_patient(id))
    }
}

impl ImmunizationRepository for YamlStore {
    fn immunizations_for_patient(&self, patient_id: PatientId) -> VaxResult<Vec<Immunization>> {
        self.inner.immunizations_for_patient(patient_id)
    }

    fn get_immunization(&self, id: ImmunizationId) -> VaxResult<Option<Immunization>> {
        self.inner.get_immunization(id)
    }

    fn insert_immunization(&self, record: ImmunizationRecord) -> VaxResult<Immunization> {
        self.mutate(|store| store.insert_immunization(record))
    }

    fn delete_immunization(&self, id: ImmunizationId) -> VaxResult<bool> {
        self.mutate(|store| store.delete_immunization(id))
    }
}

impl DoctorRepository for YamlStore {
    fn get_doctor(&self, id: DoctorId) -> VaxResult<Option<Doctor>> {
        self.inner.get_doctor(id)
    }

    fn find_doctor_by_username(&self, username: &str) -> VaxResult<Option<Doctor>> {
        self.inner.find_doctor_by_username(username)
    }

    fn insert_doctor(&self, username: NonEmptyText, password_hash: String) -> VaxResult<Doctor> {
        self.mutate(|store| store.insert_doctor(username, password_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn seed(store: &YamlStore) -> (Patient, Vaccine) {
        let doctor = store
            .insert_doctor(NonEmptyText::new("dr.georgiev").unwrap(), "hash".into())
            .expect("insert doctor");
        let vaccine = store
            .insert_vaccine(NewVaccine {
                name: NonEmptyText::new("MMR").unwrap(),
                is_mandatory: true,
                recommended_month: Some(13),
            })
            .expect("insert vaccine");
        let patient = store
            .insert_patient(
                doctor.id,
                NewPatient {
                    first_name: NonEmptyText::new("Ivan").unwrap(),
                    last_name: NonEmptyText::new("Dimitrov").unwrap(),
                    national_id: NationalId::parse("2203150000").unwrap(),
                    birth_date: NaiveDate::from_ymd_opt(2022, 3, 15).unwrap(),
                },
            )
            .expect("insert patient");
        store
            .insert_immunization(ImmunizationRecord {
                patient_id: patient.id,
                vaccine_id: vaccine.id,
                date_given: NaiveDate::from_ymd_opt(2023, 4, 20).unwrap(),
                doctor_id: doctor.id,
                created_at: Utc.with_ymd_and_hms(2023, 4, 20, 9, 30, 0).unwrap(),
            })
            .expect("insert immunization");
        (patient, vaccine)
    }

    #[test]
    fn test_open_creates_directory_without_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("nested").join("data");

        let store = YamlStore::open(&data_dir).expect("open should succeed");

        assert!(data_dir.is_dir(), "data directory should be created");
        assert!(!store.path().exists(), "file is only written on mutation");
        assert!(store.list_vaccines().unwrap().is_empty());
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (patient, vaccine) = {
            let store = YamlStore::open(temp_dir.path()).expect("open should succeed");
            seed(&store)
        };

        let reopened = YamlStore::open(temp_dir.path()).expect("reopen should succeed");

        assert_eq!(reopened.get_patient(patient.id).unwrap(), Some(patient.clone()));
        assert_eq!(reopened.list_vaccines().unwrap(), vec![vaccine.clone()]);
        let ids = reopened.administered_vaccine_ids(patient.id).unwrap();
        assert!(ids.contains(&vaccine.id));
        assert!(reopened.find_doctor_by_username("dr.georgiev").unwrap().is_some());
    }

    #[test]
    fn test_sequences_continue_after_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        {
            let store = YamlStore::open(temp_dir.path()).expect("open should succeed");
            seed(&store);
        }

        let reopened = YamlStore::open(temp_dir.path()).expect("reopen should succeed");
        let next = reopened
            .insert_vaccine(NewVaccine {
                name: NonEmptyText::new("Hexavalent (1)").unwrap(),
                is_mandatory: true,
                recommended_month: Some(2),
            })
            .expect("insert vaccine");
        assert_eq!(next.id, VaccineId(2));
    }

    #[test]
    fn test_failed_mutation_leaves_file_untouched() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = YamlStore::open(temp_dir.path()).expect("open should succeed");
        let (_, vaccine) = seed(&store);
        let before = fs::read_to_string(store.path()).expect("store file should exist");

        let err = store
            .delete_vaccine(vaccine.id)
            .expect_err("referenced vaccine should not be deleted");
        assert!(matches!(err, VaxError::VaccineInUse(_)));

        let after = fs::read_to_string(store.path()).expect("store file should exist");
        assert_eq!(before, after);
        assert!(!temp_dir.path().join("records.yaml.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(STORE_FILENAME), "vaccines: [1, 2").unwrap();

        let err = YamlStore::open(temp_dir.path()).expect_err("corrupt file should fail");
        assert!(matches!(err, VaxError::YamlDeserialization(_)));
    }

    #[test]
    fn test_sequences_repaired_from_ids() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let yaml = "vaccines:\n  - id: 7\n    name: MMR\n    is_mandatory: true\n    recommended_month: 13\n";
        fs::write(temp_dir.path().join(STORE_FILENAME), yaml).unwrap();

        let store = YamlStore::open(temp_dir.path()).expect("open should succeed");
        let next = store
            .insert_vaccine(NewVaccine {
                name: NonEmptyText::new("Varicella").unwrap(),
                is_mandatory: false,
                recommended_month: None,
            })
            .expect("insert vaccine");
        assert_eq!(next.id, VaccineId(8));
    }

    #[test]
    fn test_failed_write_discards_change() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = YamlStore::open(temp_dir.path()).expect("open should succeed");
        let blocker = temp_dir.path().join("records.yaml.tmp");
        fs::create_dir(&blocker).expect("create blocking directory");

        let err = store
            .insert_vaccine(NewVaccine {
                name: NonEmptyText::new("MMR").unwrap(),
                is_mandatory: true,
                recommended_month: Some(13),
            })
            .expect_err("write into a directory should fail");
        assert!(matches!(err, VaxError::FileWrite(_)));
        assert!(store.list_vaccines().unwrap().is_empty());

        fs::remove_dir(&blocker).expect("remove blocking directory");
        let next = store
            .insert_vaccine(NewVaccine {
                name: NonEmptyText::new("BCG").unwrap(),
                is_mandatory: true,
                recommended_month: Some(0),
            })
            .expect("insert vaccine");
        assert_eq!(next.id, VaccineId(1));

        let reopened = YamlStore::open(temp_dir.path()).expect("reopen should succeed");
        let names: Vec<_> = reopened
            .list_vaccines()
            .unwrap()
            .into_iter()
            .map(|v| v.name.into_inner())
            .collect();
        assert_eq!(names, vec!["BCG".to_string()]);
    }
}
