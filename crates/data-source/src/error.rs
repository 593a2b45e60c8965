use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read the snapshot file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The HTTP request to the bridge failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The bridge returned status {status}: {body}")]
    Bridge { status: u16, body: String },

    #[error("Failed to deserialize the snapshot: {0}")]
    Deserialization(String),

    #[error("Invalid source configuration: {0}")]
    InvalidConfig(String),
}
