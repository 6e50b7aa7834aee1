#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Retrieval source returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to decode proxy envelope: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("Response too short to be a sheet export ({len} bytes, minimum {min})")]
    TooShort { len: usize, min: usize },
    #[error("All {attempts} retrieval sources exhausted")]
    Exhausted { attempts: usize },
    #[error("Failed to tokenize CSV: {0}")]
    Csv(#[from] csv::Error),
}
