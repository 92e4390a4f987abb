use std::time::Duration;

use formats::{EnrichmentError, GeocodeAddress};
use foundation::LonLat;
use reqwest::Client;
use tracing::debug;

/// Query URL for a reverse lookup at `at`.
pub fn lookup_url(base: &str, at: LonLat) -> String {
    format!(
        "{}?latitude={}&longitude={}&localityLanguage=en",
        base.trim_end_matches('/'),
        at.lat_deg,
        at.lon_deg
    )
}

/// Resolves `at` to an address. Every failure, the timeout included, comes
/// back as an [`EnrichmentError`] for the selection to fall back on.
pub async fn reverse_geocode(
    client: &Client,
    base: &str,
    at: LonLat,
    timeout: Duration,
) -> Result<GeocodeAddress, EnrichmentError> {
    let url = lookup_url(base, at);
    debug!("reverse geocode {url}");
    match tokio::time::timeout(timeout, fetch(client, &url)).await {
        Ok(result) => result,
        Err(_) => Err(EnrichmentError::TimedOut),
    }
}

async fn fetch(client: &Client, url: &str) -> Result<GeocodeAddress, EnrichmentError> {
    let resp = client.get(url).send().await.map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(EnrichmentError::Status(status.as_u16()));
    }
    resp.json::<GeocodeAddress>().await.map_err(transport)
}

fn transport(err: reqwest::Error) -> EnrichmentError {
    if err.is_decode() {
        EnrichmentError::Decode(err.to_string())
    } else if err.is_timeout() {
        EnrichmentError::TimedOut
    } else {
        EnrichmentError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::lookup_url;
    use foundation::LonLat;

    #[test]
    fn url_carries_lat_then_lon() {
        assert_eq!(
            lookup_url("https://geo.example/reverse/", LonLat::new(-100.5, 30.25)),
            "https://geo.example/reverse?latitude=30.25&longitude=-100.5&localityLanguage=en"
        );
    }
}
