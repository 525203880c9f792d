use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::info;

use crate::error::SpeedtestError;

pub fn build_client() -> Result<Client, SpeedtestError> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        // a slow link must be allowed to run to completion
        .timeout(None::<Duration>)
        .build()
        .map_err(SpeedtestError::Client)
}

/// Issue the GET and hand back the body as a blocking reader. The status
/// code is logged but not checked.
pub fn open(client: &Client, url: &str) -> Result<Response, SpeedtestError> {
    let response = client.get(url).send().map_err(|source| SpeedtestError::Request {
        url: url.to_string(),
        source,
    })?;
    info!(
        status = %response.status(),
        content_length = ?response.content_length(),
        "Response opened"
    );
    Ok(response)
}
