//! Eligibility engine.
//!
//! Decides which catalog vaccines are currently required for a child of a given age, and splits
//! the catalog against the set of vaccines already recorded for that child. Everything here is a
//! pure function over borrowed values; callers fetch the catalog and the administered set first.
//!
//! ## Rules
//!
//! Each vaccine is evaluated on its own, in catalog order:
//!
//! 1. Optional vaccines are never required.
//! 2. Between 18 and 24 months inclusive, only vaccines recommended at exactly 18 months are
//!    required. Mandatory vaccines with any other recommended month are left out in this window
//!    even when already due.
//! 3. At any other age a vaccine is required once the age reaches its recommended month.
//! 4. A vaccine without a recommended month is never required.
//!
//! Rule 2 hides overdue vaccines for children in the window. It is kept as written pending a
//! decision from the schedule owners.

use crate::constants::{CATCH_UP_BAND_END, CATCH_UP_BAND_START, CATCH_UP_MONTH};
use crate::model::{Vaccine, VaccineId};
use std::collections::HashSet;

/// Whether `vaccine` is required for a child aged `age_months`.
pub fn is_required(age_months: i32, vaccine: &Vaccine) -> bool {
    if !vaccine.is_mandatory {
        return false;
    }

    if (CATCH_UP_BAND_START..=CATCH_UP_BAND_END).contains(&age_months) {
        return vaccine.recommended_month == Some(CATCH_UP_MONTH);
    }

    matches!(vaccine.recommended_month, Some(month) if age_months >= month)
}

/// Selects the mandatory vaccines currently due at `age_months`.
///
/// Output follows catalog order and keeps duplicates if the catalog has them. Any age is
/// accepted; an empty catalog or a negative age simply produce an empty list.
pub fn required_mandatory_vaccines(age_months: i32, catalog: &[Vaccine]) -> Vec<&Vaccine> {
    catalog
        .iter()
        .filter(|vaccine| is_required(age_months, vaccine))
        .collect()
}

/// A catalog split against one patient's recorded doses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImmunizationStatus<'a> {
    /// Every catalog vaccine recorded for the patient, required or not.
    pub administered: Vec<&'a Vaccine>,
    /// Required vaccines that have been recorded.
    pub given: Vec<&'a Vaccine>,
    /// Required vaccines that have not been recorded.
    pub missing: Vec<&'a Vaccine>,
}

/// Splits the catalog and the required subset against the administered set.
///
/// All three lists preserve the order of their source: `administered` follows `catalog`,
/// `given` and `missing` follow `required`.
pub fn partition<'a>(
    catalog: &'a [Vaccine],
    required: &[&'a Vaccine],
    administered: &HashSet<VaccineId>,
) -> ImmunizationStatus<'a> {
    let recorded: Vec<&Vaccine> = catalog
        .iter()
        .filter(|vaccine| administered.contains(&vaccine.id))
        .collect();

    let (given, missing): (Vec<&Vaccine>, Vec<&Vaccine>) = required
        .iter()
        .copied()
        .partition(|vaccine| administered.contains(&vaccine.id));

    ImmunizationStatus {
        administered: recorded,
        given,
        missing,
    }
}

/// Runs both stages for a child of `age_months`.
pub fn evaluate<'a>(
    age_months: i32,
    catalog: &'a [Vaccine],
    administered: &HashSet<VaccineId>,
) -> ImmunizationStatus<'a> {
    let required = required_mandatory_vaccines(age_months, catalog);
    partition(catalog, &required, administered)
}
