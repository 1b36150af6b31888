use crate::application::router::ScanRequest;
use crate::domain::geo::Coordinates;
use crate::domain::signals::RequestSignals;
use crate::error::{QrError, Result};
use serde::Deserialize;
use std::io::Read;

/// One scan as captured by the transport layer.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScanRow {
    pub code: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub requested_with: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub scanner: Option<bool>,
}

impl From<ScanRow> for ScanRequest {
    fn from(row: ScanRow) -> Self {
        // Empty and trailing-missing fields both arrive as `None`.
        let mut signals = RequestSignals::new(
            row.user_agent.unwrap_or_default(),
            row.requested_with.unwrap_or_default(),
            row.referer.unwrap_or_default(),
        )
        .with_scanner_hint(row.scanner.unwrap_or(false));
        signals.explicit_app_override = row.app.filter(|a| !a.trim().is_empty());

        Self {
            code: row.code,
            signals,
            coords: row.lat.zip(row.lng).and_then(|(lat, lng)| Coordinates::new(lat, lng)),
            client_address: row.ip.unwrap_or_default(),
        }
    }
}

/// Reads scan requests from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// yielding one `Result<ScanRequest>` per row so a bad row never stops the batch.
pub struct ScanReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScanReader<R> {
    /// Creates a new `ScanReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts scan rows.
    pub fn scans(self) -> impl Iterator<Item = Result<ScanRequest>> {
        self.reader
            .into_deserialize::<ScanRow>()
            .map(|result| result.map(ScanRequest::from).map_err(QrError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "code,user_agent,requested_with,referer,app,lat,lng,ip,scanner";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n\
             SHARED1, Mozilla/5.0, com.phonepe.app, , , 12.97, 77.59, 203.0.113.7, \n\
             SHARED1, , , , gpay, , , , true"
        );
        let scans: Vec<Result<ScanRequest>> = ScanReader::new(data.as_bytes()).scans().collect();
        assert_eq!(scans.len(), 2);

        let first = scans[0].as_ref().unwrap();
        assert_eq!(first.code, "SHARED1");
        assert_eq!(first.signals.requested_with, "com.phonepe.app");
        assert_eq!(first.coords, Coordinates::new(12.97, 77.59));
        assert_eq!(first.client_address, "203.0.113.7");
        assert_eq!(first.signals.explicit_app_override, None);
        assert!(!first.signals.scanner_hint);

        let second = scans[1].as_ref().unwrap();
        assert_eq!(second.signals.explicit_app_override.as_deref(), Some("gpay"));
        assert_eq!(second.coords, None);
        assert!(second.signals.scanner_hint);
    }

    #[test]
    fn test_out_of_range_coordinates_are_dropped() {
        let data = format!("{HEADER}\nSHARED1,,,,,123.0,77.59,,");
        let scan = ScanReader::new(data.as_bytes()).scans().next().unwrap().unwrap();
        assert_eq!(scan.coords, None);
    }

    #[test]
    fn test_short_rows_use_defaults() {
        let data = format!("{HEADER}\nSHARED1,curl/8.0");
        let scan = ScanReader::new(data.as_bytes()).scans().next().unwrap().unwrap();
        assert_eq!(scan.signals.user_agent, "curl/8.0");
        assert_eq!(scan.client_address, "");
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\nSHARED1,,,,,north,77.59,,");
        let results: Vec<Result<ScanRequest>> = ScanReader::new(data.as_bytes()).scans().collect();
        assert!(results[0].is_err());
    }
}
