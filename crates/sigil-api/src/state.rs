//! Shared application state

use sigil_audit::{LogRecorder, MemoryRequestLog, RequestLog};
use sigil_auth::AuthService;
use std::sync::Arc;

/// State shared by every handler
pub struct AppState {
    /// Authentication core (keys, token services, passwords)
    pub auth: Arc<AuthService>,
    /// Request log store, read by the `/logs` endpoints
    pub logs: Arc<dyn RequestLog>,
    /// Fire-and-forget recording handle feeding `logs`
    pub recorder: LogRecorder,
}

impl AppState {
    /// Assemble state with the in-memory log store
    pub fn new(auth: AuthService) -> Arc<Self> {
        Self::with_log_store(auth, Arc::new(MemoryRequestLog::default()))
    }

    /// Assemble state with a caller-provided log store
    pub fn with_log_store(auth: AuthService, logs: Arc<dyn RequestLog>) -> Arc<Self> {
        let recorder = LogRecorder::spawn(logs.clone());
        Arc::new(Self {
            auth: Arc::new(auth),
            logs,
            recorder,
        })
    }
}
