#[cfg(test)]
use crate::server::store::memory::MemStore;
#[cfg(not(test))]
use crate::server::store::pg::PgStore;

/// Backing store the handlers run against; swapped for the in-memory
/// implementation under test, as with the database mocks.
#[cfg(not(test))]
pub(crate) type AppStore = PgStore;
#[cfg(test)]
pub(crate) type AppStore = MemStore;

pub(crate) struct AppState {
    store: AppStore,
}

impl AppState {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }
}
