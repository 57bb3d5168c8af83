//! Mock implementation of the backend adapter trait for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::adapters::{AdapterError, AdapterResult, BackendAdapter};
use crate::data::{Collection, Mode, Record};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory remote backend with scripted data and failure switches.
///
/// Saved collections become what later fetches return. Collections never
/// scripted or saved fetch as empty, like a missing remote file.
pub struct MockAdapter {
    mode: Mode,
    configured: AtomicBool,
    valid: AtomicBool,
    fail_fetch: AtomicBool,
    fail_save: AtomicBool,
    fail_connect: AtomicBool,
    records: Mutex<HashMap<Collection, Vec<Record>>>,
    calls: Mutex<Vec<String>>,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
    save_gate: Mutex<Option<Arc<Notify>>>,
    fetch_started: Notify,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl MockAdapter {
    /// A configured, healthy backend for `mode`
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            configured: AtomicBool::new(true),
            valid: AtomicBool::new(true),
            fail_fetch: AtomicBool::new(false),
            fail_save: AtomicBool::new(false),
            fail_connect: AtomicBool::new(false),
            records: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fetch_gate: Mutex::new(None),
            save_gate: Mutex::new(None),
            fetch_started: Notify::new(),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Script the remote contents of a collection
    pub fn with_records(self, collection: Collection, records: Vec<Record>) -> Self {
        lock(&self.records).insert(collection, records);
        self
    }

    /// Behave as if credentials were missing
    pub fn unconfigured(self) -> Self {
        self.configured.store(false, Ordering::SeqCst);
        self
    }

    /// Result of `validate_connection`
    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::SeqCst);
    }

    /// Make fetches fail with HTTP 503
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make saves fail with HTTP 503
    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// Make `connect` fail
    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Hold every following fetch until the returned gate is notified once per fetch
    pub fn gate_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.fetch_gate) = Some(gate.clone());
        gate
    }

    /// Hold every following save until the returned gate is notified once per save
    pub fn gate_saves(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.save_gate) = Some(gate.clone());
        gate
    }

    /// Resolves once a fetch has started
    pub async fn fetch_started(&self) {
        self.fetch_started.notified().await
    }

    /// Current remote contents of a collection
    pub fn stored(&self, collection: Collection) -> Option<Vec<Record>> {
        lock(&self.records).get(&collection).cloned()
    }

    /// Calls received so far, e.g. `fetch:events`, `save:blogs`
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Number of `connect` calls
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of `disconnect` calls
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    fn record_call(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn failure(&self, operation: &str) -> AdapterError {
        AdapterError::Status {
            backend: self.mode,
            status: 503,
            message: format!("mock {} failure", operation),
        }
    }
}

#[async_trait]
impl BackendAdapter for MockAdapter {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> AdapterResult<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.record_call("connect".to_string());
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(self.failure("connect"));
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.record_call("disconnect".to_string());
    }

    async fn validate_connection(&self) -> bool {
        self.record_call("validate".to_string());
        self.is_configured() && self.valid.load(Ordering::SeqCst)
    }

    async fn fetch_collection(&self, collection: Collection) -> AdapterResult<Vec<Record>> {
        self.record_call(format!("fetch:{}", collection));
        // Snapshot before waiting so a gated fetch returns what was there when it started
        let snapshot = self.stored(collection).unwrap_or_default();
        self.fetch_started.notify_one();

        let gate = lock(&self.fetch_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(self.failure("fetch"));
        }
        Ok(snapshot)
    }

    async fn save_collection(&self, collection: Collection, records: &[Record]) -> AdapterResult<()> {
        self.record_call(format!("save:{}", collection));

        let gate = lock(&self.save_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_save.load(Ordering::SeqCst) {
            return Err(self.failure("save"));
        }
        lock(&self.records).insert(collection, records.to_vec());
        Ok(())
    }
}
