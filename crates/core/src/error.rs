use crate::model::{DoctorId, ImmunizationId, PatientId, VaccineId};
use vax_types::NationalId;

#[derive(Debug, thiserror::Error)]
pub enum VaxError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] vax_types::TextError),

    #[error("patient {0} not found")]
    PatientNotFound(PatientId),
    #[error("vaccine {0} not found")]
    VaccineNotFound(VaccineId),
    #[error("immunization {0} not found")]
    ImmunizationNotFound(ImmunizationId),
    #[error("doctor {0} not found")]
    DoctorNotFound(DoctorId),
    #[error("doctor {doctor} has no access to patient {patient}")]
    AccessDenied { doctor: DoctorId, patient: PatientId },

    #[error("a patient with national id {0} already exists")]
    DuplicateNationalId(NationalId),
    #[error("username {0} is already taken")]
    DuplicateUsername(String),
    #[error("vaccine {vaccine} is already recorded for patient {patient}")]
    AlreadyAdministered {
        patient: PatientId,
        vaccine: VaccineId,
    },
    #[error("vaccine {0} still has recorded immunizations")]
    VaccineInUse(VaccineId),

    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("session is unknown or expired")]
    InvalidSession,
    #[error("failed to hash password: {0}")]
    PasswordHash(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type VaxResult<T> = std::result::Result<T, VaxError>;
