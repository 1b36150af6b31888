use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

pub const SCAN_HEADER: &str = "code,user_agent,requested_with,referer,app,lat,lng,ip,scanner";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Writes `rows` under the scan CSV header into a temp file.
pub fn scans_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{SCAN_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}
