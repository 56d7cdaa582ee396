use mnemo_rs_memory::MemoryError;

/// Errors returned by vector-memory clients and the record sync.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The API key environment variable is unset or empty.
    #[error("missing API key in ${env_var}: {hint}")]
    MissingApiKey { env_var: String, hint: String },
    /// Transport or decode failure from the HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    /// Operation not offered by this provider.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}
