// In memory implementation of the CorrelationStore port.
//
// Purpose
// - Support handler tests and local development without Redis.
//
// Responsibilities
// - Keep entries under the same namespaced keys the Redis adapter uses.
// - Expire entries against an injected clock.
// - Record every call so tests can assert that no store I/O happened.

use crate::core::clock::{Clock, SystemClock};
use crate::core::leave::correlation::{DEFAULT_KEY_NAMESPACE, correlation_key, positive_ttl};
use crate::core::ports::{CorrelationStore, PutOutcome, StoreError};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    Put {
        instance_code: String,
        event_id: String,
        ttl: TimeDelta,
    },
    Get {
        instance_code: String,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    event_id: String,
    expires_at: DateTime<Utc>,
}

pub struct InMemoryCorrelationStore {
    namespace: String,
    entries: RwLock<HashMap<String, Entry>>,
    operations: Mutex<Vec<StoreOperation>>,
    clock: Arc<dyn Clock>,
    is_offline: bool,
}

impl Default for InMemoryCorrelationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCorrelationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            namespace: DEFAULT_KEY_NAMESPACE.to_string(),
            entries: RwLock::new(HashMap::new()),
            operations: Mutex::new(Vec::new()),
            clock,
            is_offline: false,
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn operations(&self) -> Vec<StoreOperation> {
        self.operations.lock().await.clone()
    }

    /// Remaining lifetime of a live entry.
    pub async fn ttl_of(&self, instance_code: &str) -> Option<TimeDelta> {
        let key = correlation_key(&self.namespace, instance_code);
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(&key)
            .map(|entry| entry.expires_at - now)
            .filter(|remaining| *remaining > TimeDelta::zero())
    }
}

#[async_trait::async_trait]
impl CorrelationStore for InMemoryCorrelationStore {
    async fn put(
        &self,
        instance_code: &str,
        event_id: &str,
        ttl: TimeDelta,
    ) -> Result<PutOutcome, StoreError> {
        self.operations.lock().await.push(StoreOperation::Put {
            instance_code: instance_code.to_string(),
            event_id: event_id.to_string(),
            ttl,
        });
        if self.is_offline {
            return Err(StoreError::Backend("Correlation store offline".into()));
        }
        if positive_ttl(ttl).is_none() {
            return Ok(PutOutcome::SkippedExpired);
        }

        let entry = Entry {
            event_id: event_id.to_string(),
            expires_at: self.clock.now() + ttl,
        };
        self.entries
            .write()
            .await
            .insert(correlation_key(&self.namespace, instance_code), entry);
        Ok(PutOutcome::Stored)
    }

    async fn get(&self, instance_code: &str) -> Result<Option<String>, StoreError> {
        self.operations.lock().await.push(StoreOperation::Get {
            instance_code: instance_code.to_string(),
        });
        if self.is_offline {
            return Err(StoreError::Backend("Correlation store offline".into()));
        }

        let key = correlation_key(&self.namespace, instance_code);
        let now = self.clock.now();
        let mut guard = self.entries.write().await;
        match guard.get(&key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.event_id.clone())),
            Some(_) => {
                guard.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
