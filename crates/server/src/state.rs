//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::{
    RegistrarError, Registrars, RegistrationService, RemoteRegistrar, UserStore,
};
use crate::storage::FileStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// user store, the registrar used by bulk imports, and the file stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    registration: RegistrationService,
    registrar: Registrars,
    imports: FileStore,
    reports: FileStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - User store backing the registration service
    ///
    /// Bulk imports register through `config.registrar_url` when it is set,
    /// and into `store` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote registrar client cannot be built.
    pub fn new(config: ServerConfig, store: UserStore) -> Result<Self, RegistrarError> {
        let registration = RegistrationService::new(store);

        let registrar = match &config.registrar_url {
            Some(url) => {
                tracing::info!(registrar_url = %url, "Bulk imports use remote registrar");
                Registrars::Remote(RemoteRegistrar::new(url.clone())?)
            }
            None => Registrars::Local(registration.clone()),
        };

        let imports = FileStore::new(&config.import_dir);
        let reports = FileStore::new(&config.report_dir);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                registration,
                registrar,
                imports,
                reports,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the in-process registration service.
    #[must_use]
    pub fn registration(&self) -> &RegistrationService {
        &self.inner.registration
    }

    /// Get the registrar used by bulk imports.
    #[must_use]
    pub fn registrar(&self) -> &Registrars {
        &self.inner.registrar
    }

    /// Get the store that local-file imports are read from.
    #[must_use]
    pub fn imports(&self) -> &FileStore {
        &self.inner.imports
    }

    /// Get the store that generated reports are written to.
    #[must_use]
    pub fn reports(&self) -> &FileStore {
        &self.inner.reports
    }
}
