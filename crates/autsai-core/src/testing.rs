//! In-memory gateway for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use autsai_db::{AuthState, Gateway, GatewayError, ListQuery, UploadOptions};
use autsai_types::Collection;
use autsai_types::api::User;

pub(crate) struct MemoryGateway {
    records: Mutex<HashMap<Collection, Vec<Value>>>,
    uploads: Mutex<HashMap<String, Vec<u8>>>,
    writes: Mutex<Vec<(Collection, String, Value)>>,
    auth: watch::Sender<AuthState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    list_calls: AtomicUsize,
    read_delay: Duration,
}

impl MemoryGateway {
    pub fn new() -> Self {
        let (auth, _) = watch::channel(AuthState {
            user: Some(User {
                id: "user_1".into(),
                email: "carlos@sportsclub.com".into(),
            }),
            is_loading: false,
        });
        Self {
            records: Mutex::new(HashMap::new()),
            uploads: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            auth,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            read_delay: Duration::ZERO,
        }
    }

    /// A gateway where every call fails.
    pub fn offline() -> Self {
        let gateway = Self::new();
        gateway.fail_reads(true);
        gateway.fail_writes(true);
        gateway
    }

    pub fn seed(self, collection: Collection, records: Vec<Value>) -> Self {
        self.records
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .extend(records);
        self
    }

    /// Make every `list` take `delay` to answer.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn sign_out(&self) {
        self.auth.send_replace(AuthState {
            user: None,
            is_loading: false,
        });
    }

    pub fn records(&self, collection: Collection) -> Vec<Value> {
        self.records
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn writes(&self) -> Vec<(Collection, String, Value)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn upload_of(&self, path: &str) -> Option<Vec<u8>> {
        self.uploads.lock().unwrap().get(path).cloned()
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), GatewayError> {
        if flag.load(Ordering::SeqCst) {
            Err(GatewayError::Storage("gateway offline".into()))
        } else {
            Ok(())
        }
    }
}

impl Gateway for MemoryGateway {
    async fn me(&self) -> Result<User, GatewayError> {
        self.check(&self.fail_reads)?;
        self.auth.borrow().user.clone().ok_or(GatewayError::Unauthenticated)
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }

    async fn list(&self, collection: Collection, query: ListQuery) -> Result<Vec<Value>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        self.check(&self.fail_reads)?;
        Ok(query.apply(self.records(collection)))
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, GatewayError> {
        self.check(&self.fail_writes)?;
        let id = record["id"].as_str().unwrap_or_default().to_string();
        self.writes
            .lock()
            .unwrap()
            .push((collection, id, record.clone()));
        self.records
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<Value, GatewayError> {
        self.check(&self.fail_writes)?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(collection)
            .or_default()
            .iter_mut()
            .find(|r| r["id"] == id)
            .ok_or_else(|| GatewayError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        self.writes
            .lock()
            .unwrap()
            .push((collection, id.to_string(), patch));
        Ok(record.clone())
    }

    async fn upload(&self, bytes: Vec<u8>, path: &str, _options: UploadOptions) -> Result<String, GatewayError> {
        self.check(&self.fail_writes)?;
        self.uploads.lock().unwrap().insert(path.to_string(), bytes);
        Ok(format!("http://localhost:3000/files/{}", path))
    }
}
