use super::geo::Coordinates;
use super::signals::PaymentProvider;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// UPI deep links for each supported payment app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpiIntents {
    #[serde(default, rename = "gpay_intent")]
    pub google_pay: Option<String>,
    #[serde(default, rename = "phonepe_intent")]
    pub phone_pe: Option<String>,
    #[serde(default, rename = "paytm_intent")]
    pub paytm: Option<String>,
}

impl UpiIntents {
    /// The non-empty deep link for `provider`, if configured.
    pub fn for_provider(&self, provider: PaymentProvider) -> Option<&str> {
        let link = match provider {
            PaymentProvider::GooglePay => self.google_pay.as_deref(),
            PaymentProvider::PhonePe => self.phone_pe.as_deref(),
            PaymentProvider::Paytm => self.paytm.as_deref(),
        };
        link.filter(|l| !l.trim().is_empty())
    }

    /// First configured link in `order`, with the provider it belongs to.
    pub fn first_available(
        &self,
        order: impl IntoIterator<Item = PaymentProvider>,
    ) -> Option<(PaymentProvider, &str)> {
        order
            .into_iter()
            .find_map(|p| self.for_provider(p).map(|link| (p, link)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub security: Option<String>,
}

/// A merchant reachable through a scan code.
///
/// Owned by the merchant store; resolution only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default, rename = "upi")]
    pub upi_intents: UpiIntents,
    #[serde(default)]
    pub google_place_id: Option<String>,
    #[serde(default, rename = "wifi")]
    pub wifi_credentials: Option<WifiCredentials>,
    #[serde(default)]
    pub menu_url: Option<String>,
    #[serde(default)]
    pub coupon_url: Option<String>,
}

impl MerchantRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: None,
            upi_intents: UpiIntents::default(),
            google_place_id: None,
            wifi_credentials: None,
            menu_url: None,
            coupon_url: None,
        }
    }

    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    /// The UPI payee address (`pa=`) of the first deep link that carries one.
    pub fn payee_address(&self) -> Option<String> {
        self.upi_intents
            .first_available(PaymentProvider::FALLBACK_ORDER)
            .and_then(|(_, link)| Url::parse(link).ok())
            .and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == "pa")
                    .map(|(_, value)| value.into_owned())
            })
    }
}

/// How the resolver picked its merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    SingleCandidate,
    NearestByCoordinates,
    NearestByIpGeolocation,
    DefaultFirst,
}

impl ResolutionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleCandidate => "single_candidate",
            Self::NearestByCoordinates => "nearest_by_coordinates",
            Self::NearestByIpGeolocation => "nearest_by_ip_geolocation",
            Self::DefaultFirst => "default_first",
        }
    }
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub merchant: MerchantRecord,
    pub method: ResolutionMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_deserialization_with_optional_fields() {
        let json = r#"{
            "id": "m1",
            "name": "Cafe One",
            "location": { "lat": 12.97, "lng": 77.59 },
            "upi": { "phonepe_intent": "phonepe://pay?pa=cafe%40ybl&pn=Cafe" },
            "wifi": { "ssid": "cafe-guest" }
        }"#;

        let merchant: MerchantRecord = serde_json::from_str(json).unwrap();
        assert_eq!(merchant.id, "m1");
        assert_eq!(merchant.location, Coordinates::new(12.97, 77.59));
        assert_eq!(merchant.upi_intents.google_pay, None);
        assert_eq!(merchant.wifi_credentials.unwrap().ssid, "cafe-guest");
        assert!(merchant.google_place_id.is_none());
    }

    #[test]
    fn test_first_available_skips_blank_links() {
        let intents = UpiIntents {
            google_pay: Some("tez://upi/pay?pa=a@okaxis".into()),
            phone_pe: Some("  ".into()),
            paytm: None,
        };
        let (provider, link) = intents
            .first_available(PaymentProvider::FALLBACK_ORDER)
            .unwrap();
        assert_eq!(provider, PaymentProvider::GooglePay);
        assert_eq!(link, "tez://upi/pay?pa=a@okaxis");
    }

    #[test]
    fn test_payee_address_is_percent_decoded() {
        let mut merchant = MerchantRecord::new("m1", "Cafe One");
        merchant.upi_intents.paytm = Some("paytmmp://pay?pa=cafe%40paytm&pn=Cafe".into());
        assert_eq!(merchant.payee_address().as_deref(), Some("cafe@paytm"));
    }

    #[test]
    fn test_payee_address_missing() {
        let mut merchant = MerchantRecord::new("m1", "Cafe One");
        assert_eq!(merchant.payee_address(), None);
        merchant.upi_intents.phone_pe = Some("phonepe://pay?pn=Cafe".into());
        assert_eq!(merchant.payee_address(), None);
    }
}
