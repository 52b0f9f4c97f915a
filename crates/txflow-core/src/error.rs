#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Esplora API failure: {0}")]
    Api(#[from] ApiError),

    #[error("transaction not found: {0}")]
    TxNotFound(String),

    #[error("invalid transaction data: {0}")]
    InvalidTxData(String),

    #[error("record parse error at line {line}: {message}")]
    RecordParse { line: usize, message: String },

    #[error("address map error: {0}")]
    LabelMap(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures talking to the block-explorer HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
