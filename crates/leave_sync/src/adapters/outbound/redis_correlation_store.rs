// CorrelationStore implementation backed by Redis.
//
// Responsibilities
// - Write `<namespace>:approval:<instance_code>` with SETEX so the key expires with the leave.
// - Read it back with GET, a nil reply meaning absent.
//
// Notes
// - Uses a ConnectionManager, which reconnects on its own and is cheap to clone per call.

use async_trait::async_trait;
use chrono::TimeDelta;
use redis::aio::ConnectionManager;

use crate::core::leave::correlation::{correlation_key, expiry_seconds};
use crate::core::ports::{CorrelationStore, PutOutcome, StoreError};

fn backend(error: redis::RedisError) -> StoreError {
    StoreError::Backend(error.to_string())
}

#[derive(Clone)]
pub struct RedisCorrelationStore {
    connection: ConnectionManager,
    namespace: String,
}

impl RedisCorrelationStore {
    /// Opens a managed connection and checks it with PING.
    pub async fn connect(url: &str, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let connection = ConnectionManager::new(client).await.map_err(backend)?;
        let store = Self {
            connection,
            namespace: namespace.into(),
        };
        store.ping().await?;
        Ok(store)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    fn key(&self, instance_code: &str) -> String {
        correlation_key(&self.namespace, instance_code)
    }
}

#[async_trait]
impl CorrelationStore for RedisCorrelationStore {
    async fn put(
        &self,
        instance_code: &str,
        event_id: &str,
        ttl: TimeDelta,
    ) -> Result<PutOutcome, StoreError> {
        let Some(seconds) = expiry_seconds(ttl) else {
            return Ok(PutOutcome::SkippedExpired);
        };
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("SETEX")
            .arg(self.key(instance_code))
            .arg(seconds)
            .arg(event_id)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(PutOutcome::Stored)
    }

    async fn get(&self, instance_code: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        let event_id: Option<String> = redis::cmd("GET")
            .arg(self.key(instance_code))
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(event_id)
    }
}
