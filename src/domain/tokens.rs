//! Case-insensitive token tables for client identification.

use super::signals::ClientCategory;

/// Package identifiers sent in `X-Requested-With` by payment app web views.
pub const REQUESTED_WITH_PACKAGES: &[(ClientCategory, &[&str])] = &[
    (
        ClientCategory::GooglePay,
        &["com.google.android.apps.nbu.paisa.user"],
    ),
    (ClientCategory::PhonePe, &["com.phonepe.app"]),
    (ClientCategory::Paytm, &["net.one97.paytm"]),
];

/// Name tokens that appear in user agents and referers.
///
/// Lens comes first so an image-recognition request is never taken for a
/// payment app when tokens overlap.
pub const APP_NAME_TOKENS: &[(ClientCategory, &[&str])] = &[
    (ClientCategory::GoogleLens, &["googlelens", "google lens", "lens/"]),
    (
        ClientCategory::GooglePay,
        &["paisa", "gpay", "google pay", "tez"],
    ),
    (ClientCategory::PhonePe, &["phonepe", "phone-pe"]),
    (ClientCategory::Paytm, &["paytm"]),
];

pub const MOBILE_PLATFORM_TOKENS: &[&str] =
    &["mobile", "android", "iphone", "ipad", "webview", "; wv"];

/// True if `haystack` contains any of `tokens`, ignoring ASCII case.
pub fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    if haystack.is_empty() {
        return false;
    }
    let haystack = haystack.to_ascii_lowercase();
    tokens
        .iter()
        .any(|token| haystack.contains(&token.to_ascii_lowercase()))
}

/// First category in `table` whose tokens occur in `haystack`.
pub fn match_table(haystack: &str, table: &[(ClientCategory, &[&str])]) -> Option<ClientCategory> {
    table
        .iter()
        .find(|(_, tokens)| contains_any(haystack, tokens))
        .map(|(category, _)| *category)
}
