//! In-memory fakes for the gate's collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::{AuthBackend, AuthRequest, AuthResponse, SecretKey, SecretStore};
use crate::config::Config;
use crate::error::{BackendError, StoreError};
use crate::gate::{SessionGate, Surface, SurfaceRegistry, SurfaceWindow};

pub const BACKEND_TOKEN: &str = "backend-token";

/// Secret store kept in memory, with a switch to make every call fail.
#[derive(Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<SecretKey, String>>,
    unreachable: AtomicBool,
}

impl MemoryStore {
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn peek(&self, key: &SecretKey) -> Option<String> {
        self.secrets.lock().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: SecretKey, secret: &str) {
        self.secrets.lock().unwrap().insert(key, secret.to_string());
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, key: &SecretKey) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &SecretKey, secret: &str) -> Result<(), StoreError> {
        self.check()?;
        self.insert(key.clone(), secret);
        Ok(())
    }

    async fn delete(&self, key: &SecretKey) -> Result<(), StoreError> {
        self.check()?;
        self.secrets.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Backend that replays queued failures, then succeeds with [`BACKEND_TOKEN`].
#[derive(Default)]
pub struct ScriptedBackend {
    failures: Mutex<VecDeque<BackendError>>,
    requests: Mutex<Vec<AuthRequest>>,
}

impl ScriptedBackend {
    pub fn fail_next(&self, err: BackendError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn requests(&self) -> Vec<AuthRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthBackend for ScriptedBackend {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(AuthResponse {
                token: BACKEND_TOKEN.to_string(),
            }),
        }
    }
}

pub struct FakeWindow;

impl SurfaceWindow for FakeWindow {
    fn open(_surface: Surface) -> Self {
        FakeWindow
    }

    fn close(self) {}
}

pub type FakeSurfaces = SurfaceRegistry<FakeWindow>;

pub struct Harness {
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub backend: Arc<ScriptedBackend>,
    pub surfaces: Arc<FakeSurfaces>,
    pub gate: SessionGate,
}

impl Harness {
    pub fn new() -> Self {
        let config = Config::default();
        let store = Arc::new(MemoryStore::default());
        let backend = Arc::new(ScriptedBackend::default());
        let surfaces = Arc::new(FakeSurfaces::new());
        let gate = SessionGate::new(&config, store.clone(), backend.clone(), surfaces.clone());
        Self {
            config,
            store,
            backend,
            surfaces,
            gate,
        }
    }
}
