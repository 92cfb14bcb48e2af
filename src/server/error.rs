use crate::server::store::StoreError;
use derive_more::{Display, Error};

/// Terminal failures of the split core. Version conflicts are deliberately
/// not here: they are a normal claim outcome, not an error.
#[derive(Debug, Display, Error)]
pub(crate) enum CoreError {
    #[display("resource not found")]
    NotFound,
    #[display("caller does not own this claim")]
    PermissionDenied,
    #[display("invalid argument: {_0}")]
    InvalidArgument(#[error(not(source))] &'static str),
    #[display("storage failed")]
    Store(StoreError),
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        CoreError::Store(e)
    }
}
