use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    dao::registry_store::RegistryStore,
    error::ServiceError,
    services::{
        catalog::GameCatalog, credentials::CredentialStore, password::PasswordScheme,
        registry::ServerRegistry, saves::SaveStore,
    },
};

pub type SharedState = Arc<AppState>;

/// Process-wide state: the installed storage backend and the password scheme.
///
/// Created once before the server accepts requests; the backend slot is the only
/// value that changes afterwards.
pub struct AppState {
    registry_store: RwLock<Option<Arc<dyn RegistryStore>>>,
    passwords: PasswordScheme,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(passwords: PasswordScheme) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            registry_store: RwLock::new(None),
            passwords,
            degraded: degraded_tx,
        })
    }

    /// Construct a state with `store` already installed.
    pub async fn with_store(passwords: PasswordScheme, store: Arc<dyn RegistryStore>) -> SharedState {
        let state = Self::new(passwords);
        state.install_registry_store(store).await;
        state
    }

    /// Obtain a handle to the current backend, if one is installed.
    pub async fn registry_store(&self) -> Option<Arc<dyn RegistryStore>> {
        let guard = self.registry_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current backend or fail with [`ServiceError::Degraded`].
    pub async fn require_registry_store(&self) -> Result<Arc<dyn RegistryStore>, ServiceError> {
        self.registry_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new backend implementation and leave degraded mode.
    pub async fn install_registry_store(&self, store: Arc<dyn RegistryStore>) {
        {
            let mut guard = self.registry_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current backend and enter degraded mode.
    pub async fn clear_registry_store(&self) {
        {
            let mut guard = self.registry_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Record a degraded mode change.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Game catalog façade over the installed backend.
    pub async fn catalog(&self) -> Result<GameCatalog, ServiceError> {
        Ok(GameCatalog::new(self.require_registry_store().await?))
    }

    /// Server registry façade over the installed backend.
    pub async fn servers(&self) -> Result<ServerRegistry, ServiceError> {
        Ok(ServerRegistry::new(self.require_registry_store().await?))
    }

    /// Credential façade over the installed backend.
    pub async fn credentials(&self) -> Result<CredentialStore, ServiceError> {
        Ok(CredentialStore::new(
            self.require_registry_store().await?,
            self.passwords.clone(),
        ))
    }

    /// Save façade over the installed backend.
    pub async fn saves(&self) -> Result<SaveStore, ServiceError> {
        Ok(SaveStore::new(self.require_registry_store().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::registry_store::MemoryRegistryStore, services::password::cheap_scheme};

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(cheap_scheme());
        assert!(state.is_degraded());
        assert!(matches!(state.catalog().await, Err(ServiceError::Degraded)));

        state
            .install_registry_store(Arc::new(MemoryRegistryStore::new()))
            .await;
        assert!(!state.is_degraded());
        assert!(state.catalog().await.is_ok());
    }

    #[tokio::test]
    async fn clearing_the_store_notifies_watchers() {
        let state = AppState::with_store(cheap_scheme(), Arc::new(MemoryRegistryStore::new())).await;
        let mut watcher = state.degraded_watcher();
        assert!(!*watcher.borrow_and_update());

        state.clear_registry_store().await;

        assert!(watcher.has_changed().unwrap());
        assert!(*watcher.borrow_and_update());
        assert!(matches!(state.saves().await, Err(ServiceError::Degraded)));
    }
}
