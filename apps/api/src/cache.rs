//! Redis-backed job-detail cache.
//!
//! Cache misses and Redis outages degrade to the database path with a
//! warning — the cache never fails a request.

use redis::AsyncCommands;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::job::JobRow;

#[derive(Clone)]
pub struct DetailCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl DetailCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(job_id: Uuid) -> String {
        format!("job:detail:{job_id}")
    }

    pub async fn get(&self, job_id: Uuid) -> Option<JobRow> {
        let key = Self::key(job_id);
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable, skipping cache read: {e}");
                return None;
            }
        };

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(payload)) => match serde_json::from_str::<JobRow>(&payload) {
                Ok(job) => {
                    debug!("Cache hit for {key}");
                    Some(job)
                }
                Err(e) => {
                    warn!("Discarding unreadable cache entry {key}: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {key}: {e}");
                None
            }
        }
    }

    pub async fn put(&self, job: &JobRow) {
        let key = Self::key(job.id);
        let payload = match serde_json::to_string(job) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to serialize job for cache: {e}");
                return;
            }
        };

        match self.client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                if let Err(e) = conn.set_ex::<_, _, ()>(&key, payload, self.ttl_secs).await {
                    warn!("Cache write failed for {key}: {e}");
                }
            }
            Err(e) => warn!("Redis unavailable, skipping cache write: {e}"),
        }
    }

    /// Drops the cached detail so the next fetch sees fresh data. Called
    /// after a successful scoring run and after job mutations.
    pub async fn invalidate(&self, job_id: Uuid) {
        let key = Self::key(job_id);
        match self.client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                if let Err(e) = conn.del::<_, ()>(&key).await {
                    warn!("Cache invalidation failed for {key}: {e}");
                } else {
                    debug!("Invalidated {key}");
                }
            }
            Err(e) => warn!("Redis unavailable, skipping cache invalidation: {e}"),
        }
    }
}
