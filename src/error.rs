use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeedtestError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("error making HTTP request to {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("error reading response body after {bytes} bytes")]
    Read {
        bytes: u64,
        #[source]
        source: std::io::Error,
    },
}
