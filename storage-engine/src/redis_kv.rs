use async_trait::async_trait;
use files_core::ports::{KeyValueDriver, KeyValueHandle};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};
use shared::{Error, Result, StoredValue, TtlSecs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Redis driver for the key-value facade
#[derive(Clone, Debug)]
pub struct RedisDriver {
    url: String,
}

impl Default for RedisDriver {
    fn default() -> Self {
        Self::new(DEFAULT_REDIS_URL)
    }
}

impl RedisDriver {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl KeyValueDriver for RedisDriver {
    async fn connect(&self) -> Result<Arc<dyn KeyValueHandle>> {
        let client = Client::open(self.url.as_str())
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", self.url, e)))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(Arc::new(RedisConnection {
            connection,
            open: AtomicBool::new(true),
        }))
    }
}

/// Multiplexed Redis connection shared by all callers
///
/// The multiplexed connection does not report its own liveness, so `open` is
/// cleared the first time a command fails because the socket went away.
pub struct RedisConnection {
    connection: MultiplexedConnection,
    open: AtomicBool,
}

/// Whether `e` means the socket itself is gone, as opposed to a command error
fn closes_transport(e: &RedisError) -> bool {
    e.is_connection_dropped() || e.is_connection_refusal() || e.is_io_error()
}

impl RedisConnection {
    fn transport_error(&self, e: RedisError) -> Error {
        if closes_transport(&e) {
            if self.open.swap(false, Ordering::AcqRel) {
                warn!("Redis transport closed: {}", e);
            }
        }
        Error::Transport(e.to_string())
    }
}

#[async_trait]
impl KeyValueHandle for RedisConnection {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| self.transport_error(e))
    }

    async fn set(&self, key: &str, value: StoredValue, ttl: TtlSecs) -> Result<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value.to_string(), ttl.0)
            .await
            .map_err(|e| self.transport_error(e))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.clone();
        let removed = conn
            .del::<_, usize>(key)
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use files_core::{ConnectionState, KeyValueStoreFacade};
    use redis::ErrorKind;
    use std::io;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[test]
    fn test_socket_errors_close_transport() {
        let reset = RedisError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(closes_transport(&reset));

        let refused = RedisError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "no"));
        assert!(closes_transport(&refused));
    }

    #[test]
    fn test_command_errors_keep_transport_open() {
        let wrong_type = RedisError::from((ErrorKind::TypeError, "not a string"));
        assert!(!closes_transport(&wrong_type));
    }

    #[tokio::test]
    async fn test_server_going_away_closes_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (release, mut released) = oneshot::channel::<()>();

        // Minimal RESP server: +OK to every command until released, then hang up
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut released => break,
                    read = socket.read(&mut buf) => {
                        let n = match read {
                            Ok(0) | Err(_) => break,
                            Ok(n) => n,
                        };
                        let commands = buf[..n]
                            .split(|b| *b == b'\n')
                            .filter(|line| line.first() == Some(&b'*'))
                            .count();
                        for _ in 0..commands {
                            if socket.write_all(b"+OK\r\n").await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        let driver = RedisDriver::new(format!("redis://{addr}"));
        let facade = KeyValueStoreFacade::create(Arc::new(driver));
        assert_eq!(facade.connect().await, ConnectionState::Connected);
        assert!(facade.is_alive());

        release.send(()).unwrap();
        server.await.unwrap();

        // The drop is only noticed by the next command
        assert_eq!(facade.get("a").await, None);
        assert!(!facade.is_alive());
        assert_eq!(facade.state(), ConnectionState::Connected);

        facade.set("a", "1", TtlSecs(10)).await;
        assert_eq!(facade.get("a").await, None);
    }

    #[tokio::test]
    async fn test_malformed_url_fails_to_connect() {
        let facade = KeyValueStoreFacade::create(Arc::new(RedisDriver::new("not a url")));

        assert_eq!(facade.connect().await, ConnectionState::Failed);
        assert!(matches!(facade.last_error(), Some(Error::Connection(_))));
        assert_eq!(facade.get("a").await, None);
    }

    #[tokio::test]
    #[ignore = "requires a Redis server on 127.0.0.1:6379"]
    async fn test_live_redis_round_trip_and_expiry() {
        let facade = KeyValueStoreFacade::create(Arc::new(RedisDriver::default()));
        assert_eq!(facade.connect().await, ConnectionState::Connected);
        assert!(facade.is_alive());

        facade.set("files_core:test:a", "1", TtlSecs(10)).await;
        assert_eq!(facade.get("files_core:test:a").await, Some("1".to_string()));

        facade.set("files_core:test:n", 7, TtlSecs(10)).await;
        assert_eq!(facade.get("files_core:test:n").await, Some("7".to_string()));

        facade.set("files_core:test:short", "x", TtlSecs(1)).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(facade.get("files_core:test:short").await, None);

        facade.delete("files_core:test:a").await;
        facade.delete("files_core:test:a").await;
        assert_eq!(facade.get("files_core:test:a").await, None);
    }
}
