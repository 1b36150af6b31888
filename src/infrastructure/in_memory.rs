use crate::domain::geo::Coordinates;
use crate::domain::merchant::MerchantRecord;
use crate::domain::ports::{GeoLocator, MerchantStore};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One entry of a merchant snapshot file: a record tagged with its scan code.
#[derive(Debug, Deserialize)]
struct StoredMerchant {
    code: String,
    #[serde(flatten)]
    record: MerchantRecord,
}

/// A thread-safe in-memory snapshot of merchants grouped by scan code.
///
/// Uses `Arc<RwLock<HashMap<String, Vec<MerchantRecord>>>>` so clones share
/// the same snapshot. Insertion order within a code is preserved.
#[derive(Default, Clone)]
pub struct InMemoryMerchantStore {
    merchants: Arc<RwLock<HashMap<String, Vec<MerchantRecord>>>>,
}

impl InMemoryMerchantStore {
    /// Creates a new, empty in-memory merchant store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON array of merchants, each carrying a `code` field.
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        let entries: Vec<StoredMerchant> = serde_json::from_reader(source)?;
        let mut merchants: HashMap<String, Vec<MerchantRecord>> = HashMap::new();
        for entry in entries {
            merchants.entry(entry.code).or_default().push(entry.record);
        }
        tracing::info!(codes = merchants.len(), "loaded merchant snapshot");
        Ok(Self {
            merchants: Arc::new(RwLock::new(merchants)),
        })
    }

    /// Appends `merchant` to the candidates for `code`.
    pub async fn insert(&self, code: impl Into<String>, merchant: MerchantRecord) {
        let mut merchants = self.merchants.write().await;
        merchants.entry(code.into()).or_default().push(merchant);
    }
}

#[async_trait]
impl MerchantStore for InMemoryMerchantStore {
    async fn candidates(&self, code: &str) -> Result<Vec<MerchantRecord>> {
        let merchants = self.merchants.read().await;
        Ok(merchants.get(code).cloned().unwrap_or_default())
    }
}

/// Geolocation from a fixed address table. Unknown addresses yield `None`.
#[derive(Default, Clone)]
pub struct StaticGeoLocator {
    table: HashMap<String, Coordinates>,
}

impl StaticGeoLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, address: impl Into<String>, coords: Coordinates) -> Self {
        self.table.insert(address.into(), coords);
        self
    }
}

#[async_trait]
impl GeoLocator for StaticGeoLocator {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>> {
        Ok(self.table.get(address.trim()).copied())
    }
}
