use crate::error::{BloomError, Result};
use crate::store::StoreClient;
use redis::{Client, Connection};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// `StoreClient` backed by Redis string bits (SETBIT / GETBIT).
///
/// Reads take `&self`, so the single connection sits behind a mutex.
pub struct RedisStore {
    conn: Mutex<Connection>,
}

impl RedisStore {
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_connection()?;
        debug!(redis_url, "connected to redis");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            BloomError::StorageError(format!("Redis lock error: {}", e))
        })
    }
}

impl StoreClient for RedisStore {
    fn set_bit(&mut self, key: &str, offset: u64, value: u8) -> Result<()> {
        let mut conn = self.conn()?;
        let _: i32 = redis::cmd("SETBIT")
            .arg(key)
            .arg(offset)
            .arg(value)
            .query(&mut *conn)?;
        Ok(())
    }

    fn get_bit(&self, key: &str, offset: u64) -> Result<u8> {
        let mut conn = self.conn()?;
        let value: u8 = redis::cmd("GETBIT")
            .arg(key)
            .arg(offset)
            .query(&mut *conn)?;
        Ok(value)
    }

    fn delete(&mut self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn()?;
        let _: i64 = redis::cmd("DEL").arg(keys).query(&mut *conn)?;
        Ok(())
    }

    fn expire(&mut self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn()?;
        let millis = u64::try_from(ttl.as_millis()).map_err(|_| {
            BloomError::InvalidConfig(format!("TTL {ttl:?} is too large"))
        })?;
        let _: i32 = redis::cmd("PEXPIRE")
            .arg(key)
            .arg(millis)
            .query(&mut *conn)?;
        Ok(())
    }
}
