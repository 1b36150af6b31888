use super::geo::Coordinates;
use super::merchant::MerchantRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to merchant records grouped by scan code.
#[async_trait]
pub trait MerchantStore: Send + Sync {
    /// All merchants sharing `code`, in their authoritative order.
    async fn candidates(&self, code: &str) -> Result<Vec<MerchantRecord>>;
}

/// Maps a client network address to approximate coordinates.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>>;
}

pub type MerchantStoreBox = Box<dyn MerchantStore>;
pub type GeoLocatorRef = Arc<dyn GeoLocator>;
