use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow { start: String, end: String },
}
