use tracing::debug;

use crate::error::FetchError;
use crate::settings::Settings;

/// Download the directory page once, without retries.
pub async fn fetch_listing_page(settings: &Settings) -> Result<String, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout())
        .build()?;

    debug!("GET {} (timeout {}s)", settings.source_url, settings.timeout_secs);
    let body = client
        .get(&settings.source_url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    debug!("Received {} bytes", body.len());

    Ok(String::from_utf8(body.to_vec())?)
}
