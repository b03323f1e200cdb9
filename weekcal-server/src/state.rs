use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};

use weekcal_core::auth::{DevAuth, FirebaseAuth, IdentityProvider, SignedIn};
use weekcal_core::config::{AuthProviderKind, RemoteBackend, WeekcalConfig};
use weekcal_core::local::{FileSnapshotStore, SnapshotStore};
use weekcal_core::mutation::MutationService;
use weekcal_core::remote::{FirestoreStore, MemoryStore, TaskStore};
use weekcal_core::session::Session;
use weekcal_core::sync::SyncEngine;

/// One signed-in user's mutation service. Requests on the same session run
/// one at a time.
pub type SharedSession = Arc<Mutex<MutationService>>;

/// Where task records live.
#[derive(Clone)]
pub enum Backend {
    Firestore(FirestoreStore),
    Memory(Arc<MemoryStore>),
}

impl Backend {
    /// The store a session talks to, authenticated as its user when the
    /// backend needs it.
    pub fn store_for(&self, signed_in: &SignedIn) -> Arc<dyn TaskStore> {
        match self {
            Backend::Firestore(store) => match &signed_in.id_token {
                Some(token) => Arc::new(store.with_id_token(token)),
                None => Arc::new(store.clone()),
            },
            Backend::Memory(store) => store.clone(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    backend: Backend,
    identity: Arc<dyn IdentityProvider>,
    snapshots: Arc<dyn SnapshotStore>,
    sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
}

impl AppState {
    pub fn new(
        backend: Backend,
        identity: Arc<dyn IdentityProvider>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        AppState {
            backend,
            identity,
            snapshots,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &WeekcalConfig) -> Result<Self> {
        let backend = match config.remote.backend {
            RemoteBackend::Firestore => Backend::Firestore(FirestoreStore::new(config.remote.firestore()?)),
            RemoteBackend::Memory => {
                tracing::warn!("using the in-memory task store; tasks are lost on exit");
                Backend::Memory(Arc::new(MemoryStore::new()))
            }
        };

        let identity: Arc<dyn IdentityProvider> = match config.auth.provider {
            AuthProviderKind::Firebase => Arc::new(FirebaseAuth::new(config.auth.firebase()?)),
            AuthProviderKind::Dev => {
                tracing::warn!("using the dev identity provider; any credential signs in");
                Arc::new(DevAuth)
            }
        };

        let snapshots = Arc::new(FileSnapshotStore::new(config.cache_path()));

        Ok(Self::new(backend, identity, snapshots))
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Build the services for a fresh sign-in and register them under a new
    /// session token. The view is not loaded yet.
    pub async fn open_session(&self, signed_in: SignedIn) -> (String, SharedSession) {
        let store = self.backend.store_for(&signed_in);
        let engine = SyncEngine::new(Session::begin(signed_in), store, self.snapshots.clone());
        let service = Arc::new(Mutex::new(MutationService::new(engine)));

        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), service.clone());
        tracing::debug!(sessions = sessions.len(), "session opened");

        (token, service)
    }

    pub async fn session(&self, token: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn close_session(&self, token: &str) -> Option<SharedSession> {
        self.sessions.write().await.remove(token)
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
