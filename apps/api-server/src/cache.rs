//! Cache backend wiring.
//!
//! The cache store is an external collaborator connected once at startup; the
//! application keeps the handle for the process lifetime. No request handler
//! reads or writes cache keys, so this module covers connection management
//! only.

use redis::aio::ConnectionManager;
use redis::Client;
use thiserror::Error;

/// Shared handle to the cache backend. Cloning is cheap and all clones drive
/// the same multiplexed connection.
pub type CacheHandle = ConnectionManager;

/// Cache backend initialization error.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache url: {0}")]
    InvalidUrl(redis::RedisError),
    #[error("cache backend unreachable: {0}")]
    Connect(redis::RedisError),
}

/// Connect to the cache backend at `url`.
///
/// The connection is established eagerly so a missing backend surfaces at
/// startup instead of on some later request. After that the manager
/// reconnects on its own following transient drops.
pub async fn connect(url: &str) -> Result<CacheHandle, CacheError> {
    let client = Client::open(url).map_err(CacheError::InvalidUrl)?;
    ConnectionManager::new(client)
        .await
        .map_err(CacheError::Connect)
}
