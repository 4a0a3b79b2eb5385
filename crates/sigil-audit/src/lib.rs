//! Sigil Audit - request-log observer
//!
//! Every HTTP request produces one log entry. Recording is strictly
//! one-way: entries travel over an unbounded channel to a spawned consumer
//! task, and a full or closed channel is reported via `tracing` and
//! otherwise ignored. The request that produced the entry never waits on
//! the sink and never fails because of it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// One recorded request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    /// Entry ID
    pub id: Uuid,
    /// When the request completed
    pub timestamp: DateTime<Utc>,
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,
    /// Response status code
    pub status: u16,
    /// Request latency in milliseconds
    pub latency_ms: u64,
    /// Subject of the verified token, if the request was authenticated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Algorithm the token was verified under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Type of the verified token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Client IP, from forwarding headers or the socket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    /// User-Agent header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Client-safe error message for failed requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestLogEntry {
    /// True for responses in the 4xx/5xx range
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Aggregate statistics over the stored entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    /// Total recorded requests
    pub total_requests: u64,
    /// Requests with a 4xx/5xx status
    pub error_count: u64,
    /// Mean latency across all entries
    pub average_latency_ms: f64,
    /// Request count per status code
    pub by_status: HashMap<u16, u64>,
    /// Request count per HTTP method
    pub by_method: HashMap<String, u64>,
    /// Request count per verification algorithm
    pub by_algorithm: HashMap<String, u64>,
}

/// Request log storage
///
/// Implementations report their own failures through `tracing`; the
/// recording side treats every append as best-effort.
#[async_trait]
pub trait RequestLog: Send + Sync {
    /// Store an entry
    async fn append(&self, entry: RequestLogEntry);

    /// Most recent entries, newest first, capped at `limit`
    async fn recent(&self, limit: usize) -> Vec<RequestLogEntry>;

    /// Aggregate statistics over the stored entries
    async fn stats(&self) -> LogStats;

    /// Number of stored entries
    async fn len(&self) -> usize;

    /// True when nothing has been recorded yet
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// In-memory ring buffer store
///
/// Oldest entries are evicted once `capacity` is reached.
#[derive(Debug)]
pub struct MemoryRequestLog {
    entries: RwLock<VecDeque<RequestLogEntry>>,
    capacity: usize,
}

/// Default retention for the in-memory store
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

impl MemoryRequestLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }
}

impl Default for MemoryRequestLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[async_trait]
impl RequestLog for MemoryRequestLog {
    async fn append(&self, entry: RequestLogEntry) {
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    async fn recent(&self, limit: usize) -> Vec<RequestLogEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(limit).cloned().collect()
    }

    async fn stats(&self) -> LogStats {
        let entries = self.entries.read().await;

        let total_requests = entries.len() as u64;
        let error_count = entries.iter().filter(|e| e.is_error()).count() as u64;
        let average_latency_ms = if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|e| e.latency_ms as f64).sum::<f64>() / entries.len() as f64
        };

        let mut by_status: HashMap<u16, u64> = HashMap::new();
        let mut by_method: HashMap<String, u64> = HashMap::new();
        let mut by_algorithm: HashMap<String, u64> = HashMap::new();
        for entry in entries.iter() {
            *by_status.entry(entry.status).or_default() += 1;
            *by_method.entry(entry.method.clone()).or_default() += 1;
            if let Some(algorithm) = &entry.algorithm {
                *by_algorithm.entry(algorithm.clone()).or_default() += 1;
            }
        }

        LogStats {
            total_requests,
            error_count,
            average_latency_ms,
            by_status,
            by_method,
            by_algorithm,
        }
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Fire-and-forget handle for recording entries
///
/// Cheap to clone; every clone feeds the same consumer task.
#[derive(Debug, Clone)]
pub struct LogRecorder {
    sender: mpsc::UnboundedSender<RequestLogEntry>,
}

impl LogRecorder {
    /// Spawn the consumer task and return the recording handle
    ///
    /// The task runs until every handle is dropped.
    pub fn spawn(store: Arc<dyn RequestLog>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<RequestLogEntry>();

        tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                store.append(entry).await;
            }
            tracing::debug!("request log consumer stopped");
        });

        Self { sender }
    }

    /// Record one entry without waiting
    ///
    /// A closed channel is logged and swallowed; the caller's request is
    /// unaffected.
    pub fn record(&self, entry: RequestLogEntry) {
        if let Err(e) = self.sender.send(entry) {
            tracing::warn!(error = %e, "dropping request log entry, consumer gone");
        }
    }
}
