use redis::Client;
use redis::aio::ConnectionManager;

/// Open the Redis connection manager that backs the event logs.
///
/// The manager reconnects on its own, so one clone per request is enough.
pub async fn create_redis_pool(redis_url: &str) -> anyhow::Result<ConnectionManager> {
    let client = Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;

    tracing::info!("Connected to Redis event log store");
    Ok(manager)
}
