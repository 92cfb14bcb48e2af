pub(crate) mod claims;
pub(crate) mod error;
pub(crate) mod payment;
pub(crate) mod presence;
