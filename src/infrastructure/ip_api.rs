//! HTTP geolocation against an ip-api.com compatible endpoint.
//!
//! Issues `GET {base_url}{address}` and reads `status`, `lat` and `lon` from
//! the JSON body. Addresses that cannot be located publicly (loopback,
//! private ranges, garbage) short-circuit to `None` without a request.

use crate::domain::geo::Coordinates;
use crate::domain::ports::GeoLocator;
use crate::error::{QrError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://ip-api.com/json/";

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Geolocation client for ip-api style JSON endpoints.
#[derive(Clone)]
pub struct IpApiGeoLocator {
    client: Client,
    base_url: Url,
}

impl IpApiGeoLocator {
    /// Creates a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::HttpError`] if the `reqwest::Client` cannot be
    /// built, or [`QrError::Config`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("qrmux/0.1 (merchant-resolution)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| QrError::Config {
            var: "geo_url".to_string(),
            reason: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self { client, base_url })
    }
}

/// Addresses worth sending to a public geolocation service.
fn is_locatable(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_locatable(IpAddr::V4(v4)),
            None => {
                let first = v6.segments()[0];
                // fc00::/7 unique-local and fe80::/10 link-local.
                let unique_local = (first & 0xfe00) == 0xfc00;
                let link_local = (first & 0xffc0) == 0xfe80;
                !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
            }
        },
    }
}

#[async_trait]
impl GeoLocator for IpApiGeoLocator {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>> {
        let Ok(ip) = address.trim().parse::<IpAddr>() else {
            tracing::debug!(address, "not an IP address, skipping geolocation");
            return Ok(None);
        };
        if !is_locatable(ip) {
            tracing::debug!(%ip, "non-public address, skipping geolocation");
            return Ok(None);
        }

        let url = self
            .base_url
            .join(&ip.to_string())
            .map_err(|e| QrError::GeolocationUnavailable(e.to_string()))?;

        let body: IpApiResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.status != "success" {
            tracing::debug!(%ip, status = %body.status, "geolocation service had no answer");
            return Ok(None);
        }

        Ok(body.lat.zip(body.lon).and_then(|(lat, lon)| Coordinates::new(lat, lon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locatable_addresses() {
        let cases = [
            ("8.8.8.8", true),
            ("127.0.0.1", false),
            ("10.1.2.3", false),
            ("192.168.0.10", false),
            ("169.254.1.1", false),
            ("0.0.0.0", false),
            ("::1", false),
            ("::ffff:192.168.1.1", false),
            ("::ffff:8.8.4.4", true),
            ("2001:4860:4860::8888", true),
            ("fd12:3456:789a::1", false),
            ("fc00::1", false),
            ("fe80::1ff:fe23:4567:890a", false),
            ("febf::1", false),
        ];
        for (raw, expected) in cases {
            let ip: IpAddr = raw.parse().unwrap();
            assert_eq!(is_locatable(ip), expected, "{raw}");
        }
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = IpApiGeoLocator::new("not a url", Duration::from_secs(1)).err();
        assert!(matches!(err, Some(QrError::Config { .. })));
    }

    #[tokio::test]
    async fn test_private_address_short_circuits() {
        // Port 9 (discard) would fail if a request were actually made.
        let locator = IpApiGeoLocator::new("http://127.0.0.1:9/json", Duration::from_millis(50))
            .unwrap();
        assert_eq!(locator.lookup("192.168.1.20").await.unwrap(), None);
        assert_eq!(locator.lookup("not-an-ip").await.unwrap(), None);
        assert_eq!(locator.lookup("fd00::20").await.unwrap(), None);
    }
}
