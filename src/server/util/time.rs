use chrono::{DateTime, Utc};

pub(crate) mod helper {
    #[cfg(not(test))]
    pub use super::now_utc;
    #[cfg(test)]
    pub use super::mock_chrono::now_utc;
}


#[cfg(not(test))]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Wire format for timestamps, seconds precision.
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}
