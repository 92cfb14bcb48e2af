use serde::Deserialize;

pub(crate) mod config;
pub(crate) mod item;
pub(crate) mod participant;
pub(crate) mod payment;

#[derive(Debug, Deserialize)]
pub(crate) struct CommonRequestParams {
    pub page: Option<u8>,
    pub page_size: Option<u8>,
}
