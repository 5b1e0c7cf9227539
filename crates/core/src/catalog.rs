//! Vaccine catalog management.

use crate::constants::NATIONAL_SCHEDULE;
use crate::model::{NewVaccine, Vaccine, VaccineId};
use crate::repositories::Store;
use crate::validation::validate_recommended_month;
use crate::{VaxError, VaxResult};
use std::sync::Arc;
use vax_types::NonEmptyText;

/// Catalog operations. The catalog is shared by every doctor.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All vaccines, in catalog order.
    pub fn list(&self) -> VaxResult<Vec<Vaccine>> {
        self.store.list_vaccines()
    }

    /// Adds a vaccine to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `VaxError::InvalidInput` if `recommended_month` is out of range.
    pub fn create(&self, new: NewVaccine) -> VaxResult<Vaccine> {
        validate_recommended_month(new.recommended_month)?;
        let vaccine = self.store.insert_vaccine(new)?;
        tracing::info!(
            vaccine_id = %vaccine.id,
            mandatory = vaccine.is_mandatory,
            "vaccine added: {}",
            vaccine.name
        );
        Ok(vaccine)
    }

    /// Removes a vaccine from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `VaxError` if:
    /// - no vaccine has this id (`VaccineNotFound`),
    /// - immunizations still reference it (`VaccineInUse`).
    pub fn delete(&self, id: VaccineId) -> VaxResult<()> {
        if !self.store.delete_vaccine(id)? {
            return Err(VaxError::VaccineNotFound(id));
        }
        tracing::info!(vaccine_id = %id, "vaccine deleted");
        Ok(())
    }

    /// Loads the national schedule into an empty catalog.
    ///
    /// Returns the number of vaccines inserted; zero when the catalog already has entries.
    pub fn seed_national_schedule(&self) -> VaxResult<usize> {
        if !self.store.list_vaccines()?.is_empty() {
            tracing::debug!("catalog already populated; skipping seed");
            return Ok(0);
        }

        for (name, is_mandatory, month) in NATIONAL_SCHEDULE {
            self.store.insert_vaccine(NewVaccine {
                name: NonEmptyText::new(name)?,
                is_mandatory: *is_mandatory,
                recommended_month: Some(*month),
            })?;
        }

        tracing::info!("seeded {} vaccines from the national schedule", NATIONAL_SCHEDULE.len());
        Ok(NATIONAL_SCHEDULE.len())
    }
}
