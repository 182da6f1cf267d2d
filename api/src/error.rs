use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Parse error for {1}: {0}")]
    Parsing(#[source] reqwest::Error, String),
    #[error("Invalid data in {origin}: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
        origin: String,
    },
    #[error("Calendar rejected credentials ({status}) for {url}")]
    Auth { status: u16, url: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Error: {0}")]
    Other(String),
}
