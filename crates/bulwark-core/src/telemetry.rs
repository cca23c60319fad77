//! Failure records and the bounded error log they are reported to.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::RenderError;
use crate::config::config;

pub type ContextTags = BTreeMap<String, String>;

/// One captured failure. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub message: String,
    pub origin: String,
    pub timestamp_utc: DateTime<Utc>,
    pub context_tags: ContextTags,
}

impl FailureRecord {
    pub fn capture(error: &RenderError, origin: impl Into<String>, context_tags: ContextTags) -> Self {
        Self {
            message: error.message(),
            origin: origin.into(),
            timestamp_utc: Utc::now(),
            context_tags,
        }
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.context_tags.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub component_path: String,
    pub context_tags: ContextTags,
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    id: &'a str,
    timestamp: &'a DateTime<Utc>,
    error: &'a str,
    component: &'a str,
    #[serde(flatten)]
    context: &'a ContextTags,
}

struct LogInner {
    entries: VecDeque<ErrorLogEntry>,
    capacity: usize,
    next_id: u64,
}

/// Append-only failure log capped at `capacity`; the oldest entry is evicted
/// first. Clones share the same buffer.
#[derive(Clone)]
pub struct ErrorLog {
    inner: Arc<Mutex<LogInner>>,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::from_config()
    }
}

impl ErrorLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(LogInner {
                entries: VecDeque::with_capacity(capacity),
                capacity,
                next_id: 1,
            })),
        }
    }

    /// A log sized by the installed `RuntimeConfig`.
    pub fn from_config() -> Self {
        Self::new(config().error_log_capacity)
    }

    pub fn record(&self, record: &FailureRecord) -> ErrorLogEntry {
        let entry = {
            let mut inner = self.inner.lock();
            let entry = ErrorLogEntry {
                id: format!("err-{:06}", inner.next_id),
                timestamp: record.timestamp_utc,
                message: record.message.clone(),
                component_path: record.origin.clone(),
                context_tags: record.context_tags.clone(),
            };
            inner.next_id += 1;
            inner.entries.push_front(entry.clone());
            let cap = inner.capacity;
            inner.entries.truncate(cap);
            entry
        };

        let report = ErrorReport {
            id: &entry.id,
            timestamp: &entry.timestamp,
            error: &entry.message,
            component: &entry.component_path,
            context: &entry.context_tags,
        };
        match serde_json::to_string(&report) {
            Ok(json) => log::error!(target: "bulwark::error_log", "error logged: {json}"),
            Err(e) => log::warn!(target: "bulwark::error_log", "could not serialize error report {}: {e}", entry.id),
        }
        entry
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<ErrorLogEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// An `on_failure` callback that records into this log.
    pub fn sink(&self) -> impl Fn(&FailureRecord) + 'static {
        let log = self.clone();
        move |record| {
            log.record(record);
        }
    }
}
