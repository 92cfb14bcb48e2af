use crate::server::database::connection::Connection;
use anyhow::Error;
use log::{error, info};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time;
use tokio_postgres::Client;

pub(crate) struct CommonPool {
    name: String,
    pub(super) connections: Mutex<VecDeque<Connection>>,
}

/// Small FIFO connection pool. Connections return to the pool when their
/// handle drops.
pub(crate) struct Pool(Arc<CommonPool>);

impl Clone for Pool {
    fn clone(&self) -> Pool {
        Pool(self.0.clone())
    }
}

pub(crate) mod connect_util {
    use anyhow::{Context, Error};
    use log::error;
    use tokio_postgres::{Client, NoTls};

    pub async fn connect(conn_str: &str) -> Result<Client, Error> {
        let (client, conn) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .context("failed to create connection")?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!("connection returned error and aborted, {}", e);
            }
        });
        Ok(client)
    }
}

impl Pool {
    const DEFAULT_SIZE: usize = 10;

    /// Create a pool of `DEFAULT_SIZE` connections against `conn_str`.
    pub async fn connect(name: &str, conn_str: &str) -> Result<Self, Error> {
        let pool = Pool(Arc::new(CommonPool {
            name: name.to_string(),
            connections: Mutex::new(VecDeque::with_capacity(Self::DEFAULT_SIZE)),
        }));
        let mut set = JoinSet::new();
        for _ in 0..Self::DEFAULT_SIZE {
            let conn_str = conn_str.to_string();
            set.spawn(async move { connect_util::connect(conn_str.as_str()).await });
        }
        while let Some(res) = set.join_next().await {
            match res {
                Ok(client) => {
                    let client = client?;
                    info!("connection created for pool={}", pool.0.name);
                    pool.0
                        .connections
                        .lock()
                        .await
                        .push_back(Connection::new(client, pool.clone()));
                }
                Err(e) => {
                    error!("join_next failed when joining, {}", e);
                }
            };
        }
        Ok(pool)
    }

    /// Acquire a connection, bailing out after `timeout` seconds.
    pub async fn acquire(&self, timeout: u64) -> Option<Connection> {
        let sleep = time::sleep(Duration::new(timeout, 0));
        tokio::pin!(sleep);
        tokio::select! {
            mut connections = self.0.connections.lock() => {
                connections.pop_front()
            },
            _ = &mut sleep => {
                error!("timed out acquiring a connection from pool={} after {}s", self.0.name, timeout);
                None
            },
        }
    }

    pub(super) fn release(&self, client: Client) {
        let pool = self.0.clone();
        let handle = thread::spawn(move || {
            let mut connections = pool.connections.blocking_lock();
            connections.push_back(Connection::new(client, Pool(pool.clone())));
        });
        if let Err(e) = handle.join() {
            error!("failed to return connection to pool, {:?}", e);
        }
    }
}
