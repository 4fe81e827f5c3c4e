// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis lock node

use super::TokenNode;
use crate::error::redact;
use crate::NodeError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use sera_core::{LockName, LockToken};
use std::sync::Arc;
use std::time::Duration;

/// Deletes the key only if it still holds the caller's token
const RELEASE_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

/// Single Redis server reached over one multiplexed connection
#[derive(Clone)]
pub struct RedisNode {
    addr: String,
    conn: MultiplexedConnection,
    release: Arc<redis::Script>,
}

impl RedisNode {
    /// Connect to `addr` (`host:port` or a `redis://` URL) within `timeout`
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self, NodeError> {
        let shown = redact(addr);
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        };

        let client = redis::Client::open(url.as_str()).map_err(|e| NodeError::Connect {
            addr: shown.clone(),
            message: e.to_string(),
        })?;

        let conn = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| NodeError::Timeout {
                addr: shown.clone(),
                timeout,
            })?
            .map_err(|e| NodeError::Connect {
                addr: shown.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            addr: shown,
            conn,
            release: Arc::new(redis::Script::new(RELEASE_SCRIPT)),
        })
    }

    fn protocol_error(&self, err: redis::RedisError) -> NodeError {
        NodeError::Protocol {
            addr: self.addr.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl TokenNode for RedisNode {
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn try_acquire(
        &self,
        name: &LockName,
        token: &LockToken,
        ttl: Duration,
    ) -> Result<bool, NodeError> {
        let mut conn = self.conn.clone();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        // SET NX replies OK when set and nil when the key exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(name.as_str())
            .arg(token.as_str())
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| self.protocol_error(e))?;

        Ok(reply.as_deref() == Some("OK"))
    }

    async fn release_if_owned(
        &self,
        name: &LockName,
        token: &LockToken,
    ) -> Result<bool, NodeError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = self
            .release
            .key(name.as_str())
            .arg(token.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| self.protocol_error(e))?;

        Ok(deleted == 1)
    }
}
