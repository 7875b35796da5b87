//! In-process registration service and its user store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rollcall_core::{
    RegisteredUser, RegistrationError, RegistrationPayload, RegistrationRequest, UserId,
};

use super::registrar::{Registrar, RegistrarError};

/// Append-only, in-memory list of registered users.
///
/// Cheaply cloneable; clones share the same list. Appends are serialized by
/// a single mutex, so concurrent import runs never lose updates.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<Mutex<Vec<RegisteredUser>>>,
}

impl UserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user.
    pub fn append(&self, user: RegisteredUser) {
        self.lock().push(user);
    }

    /// Number of users stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no user has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every stored user, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RegisteredUser> {
        self.lock().clone()
    }

    // A panic while holding the lock cannot leave a half-pushed Vec behind,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Vec<RegisteredUser>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registers users into a [`UserStore`].
#[derive(Debug, Clone)]
pub struct RegistrationService {
    store: UserStore,
}

impl RegistrationService {
    /// Create a registration service backed by `store`.
    #[must_use]
    pub const fn new(store: UserStore) -> Self {
        Self { store }
    }

    /// The store this service appends to.
    #[must_use]
    pub const fn store(&self) -> &UserStore {
        &self.store
    }

    /// Validate a raw request and register it.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: `MissingName`, `MissingContact`,
    /// `InvalidEmail`, then `InvalidPhone`.
    pub fn register(&self, request: RegistrationRequest) -> Result<RegisteredUser, RegistrationError> {
        let payload = RegistrationPayload::try_from(request)?;
        Ok(self.record(payload))
    }

    /// Assign a fresh identifier to an already-validated payload and store it.
    pub fn record(&self, payload: RegistrationPayload) -> RegisteredUser {
        let user = RegisteredUser::new(UserId::generate(), payload);
        self.store.append(user.clone());

        tracing::info!(
            user_id = %user.user_id,
            has_email = user.email.is_some(),
            has_phone = user.phone.is_some(),
            "User registered"
        );

        user
    }
}

impl Registrar for RegistrationService {
    async fn register(&self, payload: RegistrationPayload) -> Result<RegisteredUser, RegistrarError> {
        Ok(self.record(payload))
    }
}
