//! Doctor accounts and login sessions.
//!
//! Passwords are stored as Argon2 PHC strings. A successful login issues an opaque token that
//! stays valid for the configured session lifetime; sessions live in memory only and are lost
//! on restart.

use crate::clock::Clock;
use crate::model::{Doctor, DoctorId};
use crate::password::{hash_password, verify_decoy, verify_password};
use crate::repositories::Store;
use crate::validation::validate_password;
use crate::{VaxError, VaxResult};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use vax_types::NonEmptyText;

/// An issued login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub doctor_id: DoctorId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, session_ttl: Duration) -> Self {
        Self {
            store,
            clock,
            session_ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a doctor account.
    ///
    /// # Arguments
    ///
    /// * `username` - Login name, unique across all doctors
    /// * `password` - Plain-text password; hashed before it reaches the store
    ///
    /// # Errors
    ///
    /// Returns `VaxError` if:
    /// - the username is blank (`Text`) or the password too short (`InvalidInput`),
    /// - the username is taken (`DuplicateUsername`),
    /// - hashing fails (`PasswordHash`).
    pub fn register(&self, username: &str, password: &str) -> VaxResult<Doctor> {
        let username = NonEmptyText::new(username)?;
        validate_password(password)?;

        if self.store.find_doctor_by_username(username.as_str())?.is_some() {
            return Err(VaxError::DuplicateUsername(username.into_inner()));
        }

        let hash = hash_password(password)?;
        let doctor = self.store.insert_doctor(username, hash)?;
        tracing::info!(doctor_id = %doctor.id, "doctor registered: {}", doctor.username);
        Ok(doctor)
    }

    /// Checks credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown username or a wrong password. The two cases
    /// are not distinguished, and both pay for one Argon2 verification.
    pub fn login(&self, username: &str, password: &str) -> VaxResult<Session> {
        let verified = match self.store.find_doctor_by_username(username.trim())? {
            Some(doctor) => verify_password(password, &doctor.password_hash).then_some(doctor),
            None => {
                verify_decoy(password);
                None
            }
        };
        let Some(doctor) = verified else {
            tracing::warn!("failed login attempt for {}", username.trim());
            return Err(VaxError::InvalidCredentials);
        };

        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            doctor_id: doctor.id,
            expires_at: self.clock.now() + self.session_ttl,
        };

        let mut sessions = self.sessions.write().map_err(|_| VaxError::LockPoisoned)?;
        let now = self.clock.now();
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.token.clone(), session.clone());

        tracing::info!(doctor_id = %doctor.id, "session opened");
        Ok(session)
    }

    /// Resolves a session token to its doctor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSession` when the token is unknown or expired. An expired session is
    /// removed.
    pub fn authenticate(&self, token: &str) -> VaxResult<Doctor> {
        let now = self.clock.now();
        let session = {
            let sessions = self.sessions.read().map_err(|_| VaxError::LockPoisoned)?;
            sessions.get(token).cloned()
        };

        let session = match session {
            Some(session) if !session.is_expired(now) => session,
            Some(_) => {
                self.sessions
                    .write()
                    .map_err(|_| VaxError::LockPoisoned)?
                    .remove(token);
                tracing::debug!("expired session evicted");
                return Err(VaxError::InvalidSession);
            }
            None => return Err(VaxError::InvalidSession),
        };

        // The doctor may have been removed from the store since login.
        self.store
            .get_doctor(session.doctor_id)?
            .ok_or(VaxError::InvalidSession)
    }

    /// Drops a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> VaxResult<()> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| VaxError::LockPoisoned)?
            .remove(token);
        if let Some(session) = removed {
            tracing::info!(doctor_id = %session.doctor_id, "session closed");
        }
        Ok(())
    }

    /// Looks up a doctor by id.
    pub fn doctor(&self, id: DoctorId) -> VaxResult<Doctor> {
        self.store
            .get_doctor(id)?
            .ok_or(VaxError::DoctorNotFound(id))
    }
}
