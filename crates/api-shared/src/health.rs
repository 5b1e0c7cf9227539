use crate::dto::HealthRes;

/// Simple health service shared by the API binaries.
///
/// This service provides a standardised way to check that the tracker is up. It does not touch
/// the store.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Vaccination tracker is alive".into(),
        }
    }
}
