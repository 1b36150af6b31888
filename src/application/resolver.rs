use crate::domain::geo::Coordinates;
use crate::domain::merchant::{MerchantRecord, ResolutionMethod, ResolutionResult};
use crate::domain::ports::GeoLocatorRef;
use crate::error::{QrError, Result};
use std::time::Duration;

/// Default budget for a single geolocation lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(1500);

/// Picks exactly one merchant out of the candidates sharing a scan code.
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone)]
pub struct MerchantResolver {
    locator: GeoLocatorRef,
    lookup_timeout: Duration,
}

impl MerchantResolver {
    /// Creates a resolver backed by `locator` for address-based lookups.
    ///
    /// # Arguments
    ///
    /// * `locator` - Geolocation collaborator consulted when the client sent no coordinates.
    /// * `lookup_timeout` - Upper bound on a single lookup; exceeding it falls back to the first candidate.
    pub fn new(locator: GeoLocatorRef, lookup_timeout: Duration) -> Self {
        Self {
            locator,
            lookup_timeout,
        }
    }

    /// Resolves `candidates` to a single merchant.
    ///
    /// Returns [`QrError::EmptyCandidateSet`] when `candidates` is empty. Any
    /// geolocation failure degrades to [`ResolutionMethod::DefaultFirst`].
    pub async fn resolve(
        &self,
        candidates: &[MerchantRecord],
        coords: Option<Coordinates>,
        client_address: &str,
    ) -> Result<ResolutionResult> {
        let first = candidates.first().ok_or(QrError::EmptyCandidateSet)?;

        if candidates.len() == 1 {
            return Ok(Self::result(first, ResolutionMethod::SingleCandidate));
        }

        if !candidates.iter().any(|m| m.location.is_some()) {
            tracing::debug!("no candidate has a location, using first");
            return Ok(Self::result(first, ResolutionMethod::DefaultFirst));
        }

        if let Some(origin) = coords {
            if let Some(nearest) = nearest(candidates, origin) {
                return Ok(Self::result(nearest, ResolutionMethod::NearestByCoordinates));
            }
        } else {
            match self.locate(client_address).await {
                Ok(origin) => {
                    if let Some(nearest) = nearest(candidates, origin) {
                        return Ok(Self::result(
                            nearest,
                            ResolutionMethod::NearestByIpGeolocation,
                        ));
                    }
                }
                Err(e) => {
                    tracing::debug!(address = client_address, error = %e, "falling back to first candidate");
                }
            }
        }

        Ok(Self::result(first, ResolutionMethod::DefaultFirst))
    }

    /// Bounded, single-attempt geolocation of `address`.
    async fn locate(&self, address: &str) -> Result<Coordinates> {
        if address.trim().is_empty() {
            return Err(QrError::GeolocationUnavailable(
                "no client address".to_string(),
            ));
        }

        match tokio::time::timeout(self.lookup_timeout, self.locator.lookup(address)).await {
            Ok(Ok(Some(coords))) => Ok(coords),
            Ok(Ok(None)) => Err(QrError::GeolocationUnavailable(
                "no result for address".to_string(),
            )),
            Ok(Err(e)) => {
                tracing::warn!(address, error = %e, "geolocation lookup failed");
                Err(QrError::GeolocationUnavailable(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    address,
                    timeout = ?self.lookup_timeout,
                    "geolocation lookup timed out"
                );
                Err(QrError::GeolocationUnavailable("timed out".to_string()))
            }
        }
    }

    fn result(merchant: &MerchantRecord, method: ResolutionMethod) -> ResolutionResult {
        tracing::debug!(merchant_id = %merchant.id, %method, "resolved merchant");
        ResolutionResult {
            merchant: merchant.clone(),
            method,
        }
    }
}

/// Closest located candidate to `origin`. Ties go to the earliest candidate.
fn nearest(candidates: &[MerchantRecord], origin: Coordinates) -> Option<&MerchantRecord> {
    let mut best: Option<(&MerchantRecord, f64)> = None;
    for merchant in candidates {
        let Some(location) = merchant.location else {
            continue;
        };
        let distance = origin.distance_km(&location);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((merchant, distance)),
        }
    }
    best.map(|(merchant, _)| merchant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::GeoLocator;
    use crate::infrastructure::in_memory::StaticGeoLocator;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(id: &str, lat: f64, lng: f64) -> MerchantRecord {
        MerchantRecord::new(id, id).with_location(Coordinates::new(lat, lng).unwrap())
    }

    fn resolver_with(locator: StaticGeoLocator) -> MerchantResolver {
        MerchantResolver::new(Arc::new(locator), DEFAULT_LOOKUP_TIMEOUT)
    }

    struct CountingLocator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeoLocator for CountingLocator {
        async fn lookup(&self, _address: &str) -> Result<Option<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinates::new(0.0, 0.0))
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_rejected() {
        let resolver = resolver_with(StaticGeoLocator::new());
        let err = resolver.resolve(&[], None, "203.0.113.7").await.unwrap_err();
        assert!(matches!(err, QrError::EmptyCandidateSet));
    }

    #[tokio::test]
    async fn test_single_candidate_skips_distance() {
        let resolver = resolver_with(StaticGeoLocator::new());
        let only = MerchantRecord::new("m1", "Only");
        let result = resolver
            .resolve(&[only.clone()], Coordinates::new(10.0, 10.0), "")
            .await
            .unwrap();
        assert_eq!(result.merchant, only);
        assert_eq!(result.method, ResolutionMethod::SingleCandidate);
    }

    #[tokio::test]
    async fn test_unlocated_candidates_are_skipped_for_distance() {
        let resolver = resolver_with(StaticGeoLocator::new());
        let candidates = vec![
            MerchantRecord::new("nowhere", "Nowhere"),
            at("far", 20.0, 20.0),
        ];
        let result = resolver
            .resolve(&candidates, Coordinates::new(0.0, 0.0), "")
            .await
            .unwrap();
        assert_eq!(result.merchant.id, "far");
        assert_eq!(result.method, ResolutionMethod::NearestByCoordinates);
    }

    #[tokio::test]
    async fn test_no_located_candidates_skips_lookup() {
        let locator = Arc::new(CountingLocator {
            calls: AtomicUsize::new(0),
        });
        let resolver = MerchantResolver::new(locator.clone(), DEFAULT_LOOKUP_TIMEOUT);
        let candidates = vec![MerchantRecord::new("a", "A"), MerchantRecord::new("b", "B")];

        let result = resolver.resolve(&candidates, None, "203.0.113.7").await.unwrap();
        assert_eq!(result.merchant.id, "a");
        assert_eq!(result.method, ResolutionMethod::DefaultFirst);
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_coordinates_take_precedence_over_address() {
        let locator = Arc::new(CountingLocator {
            calls: AtomicUsize::new(0),
        });
        let resolver = MerchantResolver::new(locator.clone(), DEFAULT_LOOKUP_TIMEOUT);
        let candidates = vec![at("a", 0.0, 0.0), at("b", 5.0, 5.0)];

        let result = resolver
            .resolve(&candidates, Coordinates::new(5.0, 5.1), "203.0.113.7")
            .await
            .unwrap();
        assert_eq!(result.merchant.id, "b");
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_address_falls_back_to_first() {
        let resolver = resolver_with(StaticGeoLocator::new());
        let candidates = vec![at("a", 0.0, 0.0), at("b", 5.0, 5.0)];
        let result = resolver.resolve(&candidates, None, "  ").await.unwrap();
        assert_eq!(result.merchant.id, "a");
        assert_eq!(result.method, ResolutionMethod::DefaultFirst);
    }

    #[test]
    fn test_nearest_prefers_earliest_on_tie() {
        let candidates = vec![at("west", 0.0, -1.0), at("east", 0.0, 1.0)];
        let origin = Coordinates::new(0.0, 0.0).unwrap();
        assert_eq!(nearest(&candidates, origin).unwrap().id, "west");
    }
}
