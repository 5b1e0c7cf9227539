//! Constants used throughout the vax core crate.
//!
//! Schedule policy numbers, storage file names and startup defaults live here so the binaries
//! and the services agree on them.

/// First month (inclusive) of the special 18-24 month policy window.
pub const CATCH_UP_BAND_START: i32 = 18;

/// Last month (inclusive) of the special 18-24 month policy window.
pub const CATCH_UP_BAND_END: i32 = 24;

/// Inside the policy window only vaccines recommended at exactly this month are required.
pub const CATCH_UP_MONTH: i32 = 18;

/// Default address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default directory for the YAML store when the CLI is not given one.
pub const DEFAULT_DATA_DIR: &str = "vax_data";

/// Filename of the YAML store inside the data directory.
pub const STORE_FILENAME: &str = "records.yaml";

/// Default lifetime of a login session, in minutes.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

/// Name of the cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "access_token";

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Entries of the national childhood immunization schedule: name, mandatory, recommended month.
pub const NATIONAL_SCHEDULE: &[(&str, bool, i32)] = &[
    ("Hexavalent (1)", true, 2),
    ("Hexavalent (2)", true, 3),
    ("Hexavalent (3)", true, 4),
    ("Pneumococcal (1)", true, 2),
    ("Pneumococcal (2)", true, 4),
    ("Pneumococcal (booster)", true, 18),
    ("Rotavirus (1)", false, 2),
    ("Rotavirus (2)", false, 3),
    ("MMR", true, 13),
    ("Pentavalent (booster)", true, 18),
];
