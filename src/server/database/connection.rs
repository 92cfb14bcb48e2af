use crate::server::database::pool::Pool;
use std::ops::{Deref, DerefMut};
use tokio_postgres::Client;

/// A pooled client. Dropping the handle returns the client to its pool.
pub(crate) struct Connection {
    client: Option<Client>,
    pool: Pool,
}

impl Connection {
    pub fn new(client: Client, pool: Pool) -> Self {
        Self {
            client: Some(client),
            pool,
        }
    }
}

impl Deref for Connection {
    type Target = Client;

    fn deref(&self) -> &Client {
        self.client.as_ref().expect("client present until drop")
    }
}

impl DerefMut for Connection {
    fn deref_mut(&mut self) -> &mut Client {
        self.client.as_mut().expect("client present until drop")
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
