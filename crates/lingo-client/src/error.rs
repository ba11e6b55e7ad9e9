use thiserror::Error;

/// Errors from talking to the Lingo server.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, bad TLS...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status and a reason.
    #[error("server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Errors loading or saving durable client preferences.
#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine application data directory")]
    NoDataDir,
}
