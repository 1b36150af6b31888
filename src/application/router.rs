use super::classifier::{AppClassifier, Classification};
use super::resolver::MerchantResolver;
use crate::domain::geo::Coordinates;
use crate::domain::merchant::{MerchantRecord, ResolutionResult};
use crate::domain::ports::MerchantStoreBox;
use crate::domain::signals::{ClientCategory, PaymentProvider, RequestSignals};
use crate::error::{QrError, Result};

const REVIEW_URL_BASE: &str = "https://search.google.com/local/writereview?placeid=";

/// Everything the transport layer extracted from one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub code: String,
    pub signals: RequestSignals,
    pub coords: Option<Coordinates>,
    pub client_address: String,
}

/// What the transport layer should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseAction {
    /// Open a payment app deep link.
    PaymentRedirect {
        provider: PaymentProvider,
        deep_link: String,
    },
    /// Send an image-recognition client to the merchant's review page.
    ReviewRedirect { url: String },
    /// A payment app was detected but the merchant has no link for it.
    Chooser,
    /// Informational page; the client may resolve again with its own location.
    Landing,
}

impl ResponseAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PaymentRedirect { .. } => "payment_redirect",
            Self::ReviewRedirect { .. } => "review_redirect",
            Self::Chooser => "chooser",
            Self::Landing => "landing",
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Self::PaymentRedirect { deep_link, .. } => Some(deep_link),
            Self::ReviewRedirect { url } => Some(url),
            Self::Chooser | Self::Landing => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanDecision {
    pub code: String,
    pub classification: Classification,
    pub resolution: ResolutionResult,
    pub action: ResponseAction,
}

/// Composes classification and resolution for a scan and picks the response.
///
/// Nothing is cached between scans; every call recomputes from its inputs.
pub struct ScanRouter {
    store: MerchantStoreBox,
    classifier: AppClassifier,
    resolver: MerchantResolver,
    default_provider: Option<PaymentProvider>,
}

impl ScanRouter {
    pub fn new(store: MerchantStoreBox, resolver: MerchantResolver) -> Self {
        Self {
            store,
            classifier: AppClassifier::new(),
            resolver,
            default_provider: None,
        }
    }

    /// Payment provider to fall back on when a mobile browser or a payment
    /// app without a matching link was detected. `None` disables forcing.
    pub fn with_default_provider(mut self, provider: Option<PaymentProvider>) -> Self {
        self.default_provider = provider;
        self
    }

    pub async fn route(&self, request: &ScanRequest) -> Result<ScanDecision> {
        let candidates = self.store.candidates(&request.code).await?;
        if candidates.is_empty() {
            return Err(QrError::UnknownCode(request.code.clone()));
        }

        let classification = self.classifier.classify_with_rule(&request.signals);
        let resolution = self
            .resolver
            .resolve(&candidates, request.coords, &request.client_address)
            .await?;
        let action = self.choose_action(classification.category, &resolution.merchant);

        tracing::info!(
            code = %request.code,
            category = %classification.category,
            rule = %classification.rule,
            merchant_id = %resolution.merchant.id,
            method = %resolution.method,
            action = action.kind(),
            "routed scan"
        );

        Ok(ScanDecision {
            code: request.code.clone(),
            classification,
            resolution,
            action,
        })
    }

    fn choose_action(&self, category: ClientCategory, merchant: &MerchantRecord) -> ResponseAction {
        let detected = category.payment_provider();

        if let Some(provider) = detected
            && let Some(link) = merchant.upi_intents.for_provider(provider)
        {
            return ResponseAction::PaymentRedirect {
                provider,
                deep_link: link.to_string(),
            };
        }

        let wants_payment = detected.is_some() || category == ClientCategory::MobileBrowser;
        if wants_payment
            && let Some(preferred) = self.default_provider
            && let Some((provider, link)) =
                merchant.upi_intents.first_available(fallback_order(preferred))
        {
            tracing::debug!(%category, %provider, "using default payment provider");
            return ResponseAction::PaymentRedirect {
                provider,
                deep_link: link.to_string(),
            };
        }

        if category == ClientCategory::GoogleLens
            && let Some(place_id) = merchant
                .google_place_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
        {
            return ResponseAction::ReviewRedirect {
                url: format!("{REVIEW_URL_BASE}{place_id}"),
            };
        }

        if detected.is_some() {
            return ResponseAction::Chooser;
        }

        ResponseAction::Landing
    }
}

/// `preferred` first, then the remaining providers in fallback order.
fn fallback_order(preferred: PaymentProvider) -> impl Iterator<Item = PaymentProvider> {
    std::iter::once(preferred).chain(
        PaymentProvider::FALLBACK_ORDER
            .into_iter()
            .filter(move |p| *p != preferred),
    )
}
