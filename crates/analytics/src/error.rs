use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Nothing to report: {0}")]
    NoData(String),

    #[error("Invalid analysis parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid analysis window: {0}")]
    InvalidWindow(#[from] core_types::CoreError),
}
