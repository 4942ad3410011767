use std::sync::{Arc, Mutex, MutexGuard};

use droidhost_runtime::ContainerRuntime;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub runtime: ContainerRuntime,
    pub session: Arc<EmulatorSession>,
}

impl AppState {
    pub fn new(config: Config, runtime: ContainerRuntime) -> Self {
        Self {
            config: Arc::new(config),
            runtime,
            session: Arc::new(EmulatorSession::default()),
        }
    }
}

#[derive(Debug, Default)]
struct SessionRecord {
    running: bool,
    container_handle: String,
}

/// What the service believes about the managed container.
///
/// Nothing reconciles this with the runtime: a container that dies on its own
/// still reads as running until the next stop.
#[derive(Debug, Default)]
pub struct EmulatorSession {
    inner: Mutex<SessionRecord>,
}

impl EmulatorSession {
    // Critical sections are tiny and never span an await, so a poisoned lock
    // still holds a coherent record.
    fn lock(&self) -> MutexGuard<'_, SessionRecord> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// `(running, container_handle)` read under a single lock acquisition.
    pub fn snapshot(&self) -> (bool, String) {
        let rec = self.lock();
        (rec.running, rec.container_handle.clone())
    }

    pub fn mark_started(&self, handle: impl Into<String>) {
        let mut rec = self.lock();
        rec.running = true;
        rec.container_handle = handle.into();
    }

    pub fn mark_stopped(&self) {
        let mut rec = self.lock();
        rec.running = false;
        rec.container_handle.clear();
    }
}
