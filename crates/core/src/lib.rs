//! # Vax Core
//!
//! Core business logic for the pediatric vaccination schedule tracker.
//!
//! This crate contains:
//! - The age calculator and the eligibility engine (pure functions over in-memory values)
//! - The domain model (vaccines, patients, immunizations, doctors)
//! - Repository traits with an in-memory and a YAML file backed implementation
//! - Doctor-scoped services that enforce ownership and uniqueness rules
//!
//! **No API concerns**: HTTP routing, cookies and JSON shapes belong in `api-rest` and
//! `api-shared`.

pub mod account;
pub mod age;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod immunization;
pub mod model;
pub mod password;
pub mod patient;
pub mod repositories;
pub mod schedule;
pub mod validation;

pub use account::{AccountService, Session};
pub use age::age_in_months;
pub use catalog::CatalogService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CoreConfig;
pub use eligibility::{partition, required_mandatory_vaccines, ImmunizationStatus};
pub use error::{VaxError, VaxResult};
pub use immunization::ImmunizationService;
pub use model::{
    Doctor, DoctorId, Immunization, ImmunizationId, NewImmunization, NewPatient, NewVaccine,
    Patient, PatientId, Vaccine, VaccineId,
};
pub use patient::PatientService;
pub use repositories::{open_store, MemoryStore, Store, YamlStore};
pub use schedule::{PatientSchedule, SchedulePreview, ScheduleService};

pub use vax_types::{NationalId, NonEmptyText, TextError};

use std::sync::Arc;

/// Every service the API layers need, built over one store and one clock.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub patients: PatientService,
    pub immunizations: ImmunizationService,
    pub schedule: ScheduleService,
}

impl Services {
    /// Wires all services against a shared store.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Startup configuration (session lifetime)
    /// * `store` - Backing store shared by every service
    /// * `clock` - Source of "today" and "now"
    pub fn new(cfg: &CoreConfig, store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), clock.clone(), cfg.session_ttl()),
            catalog: CatalogService::new(store.clone()),
            patients: PatientService::new(store.clone()),
            immunizations: ImmunizationService::new(store.clone(), clock.clone()),
            schedule: ScheduleService::new(store, clock),
        }
    }
}
