use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request-derived inputs to classification.
///
/// Built once per request from the `User-Agent`, `X-Requested-With` and
/// `Referer` headers plus the optional `app` query value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    pub user_agent: String,
    pub requested_with: String,
    pub referer: String,
    pub explicit_app_override: Option<String>,
    /// Set by the caller when the scan is known to come from a camera or
    /// image scanner. Headers alone cannot tell these apart from browsers.
    pub scanner_hint: bool,
}

impl RequestSignals {
    pub fn new(
        user_agent: impl Into<String>,
        requested_with: impl Into<String>,
        referer: impl Into<String>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            requested_with: requested_with.into(),
            referer: referer.into(),
            explicit_app_override: None,
            scanner_hint: false,
        }
    }

    pub fn with_override(mut self, app: impl Into<String>) -> Self {
        self.explicit_app_override = Some(app.into());
        self
    }

    pub fn with_scanner_hint(mut self, scanner: bool) -> Self {
        self.scanner_hint = scanner;
        self
    }

    /// True when none of the header-derived fields carry any text.
    pub fn is_blank(&self) -> bool {
        self.user_agent.trim().is_empty()
            && self.requested_with.trim().is_empty()
            && self.referer.trim().is_empty()
    }
}

/// The inferred kind of software that issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientCategory {
    Browser,
    MobileBrowser,
    GooglePay,
    PhonePe,
    Paytm,
    GoogleLens,
    Camera,
    #[default]
    Unknown,
}

impl ClientCategory {
    /// Maps an explicit `app` override value to a category.
    ///
    /// Matching ignores case and surrounding whitespace. Unrecognized values
    /// yield `None` so the classifier falls through to header signals.
    pub fn from_override(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gpay" => Some(Self::GooglePay),
            "phonepe" => Some(Self::PhonePe),
            "paytm" => Some(Self::Paytm),
            "lens" => Some(Self::GoogleLens),
            _ => None,
        }
    }

    /// The payment provider behind this category, if it is a payment app.
    pub fn payment_provider(self) -> Option<PaymentProvider> {
        match self {
            Self::GooglePay => Some(PaymentProvider::GooglePay),
            Self::PhonePe => Some(PaymentProvider::PhonePe),
            Self::Paytm => Some(PaymentProvider::Paytm),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::MobileBrowser => "mobile_browser",
            Self::GooglePay => "google_pay",
            Self::PhonePe => "phonepe",
            Self::Paytm => "paytm",
            Self::GoogleLens => "google_lens",
            Self::Camera => "camera",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ClientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UPI payment applications a merchant may expose a deep link for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    GooglePay,
    PhonePe,
    Paytm,
}

impl PaymentProvider {
    /// Fallback order used when no specific app was detected.
    pub const FALLBACK_ORDER: [PaymentProvider; 3] = [Self::PhonePe, Self::GooglePay, Self::Paytm];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GooglePay => "gpay",
            Self::PhonePe => "phonepe",
            Self::Paytm => "paytm",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpay" | "google_pay" | "googlepay" => Ok(Self::GooglePay),
            "phonepe" => Ok(Self::PhonePe),
            "paytm" => Ok(Self::Paytm),
            other => Err(format!("unknown payment provider '{other}'")),
        }
    }
}
