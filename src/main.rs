use clap::Parser;
use miette::{IntoDiagnostic, Result};
use qrmux::application::resolver::MerchantResolver;
use qrmux::application::router::ScanRouter;
use qrmux::config::{Settings, load_settings};
use qrmux::domain::ports::GeoLocatorRef;
use qrmux::domain::signals::PaymentProvider;
use qrmux::infrastructure::in_memory::{InMemoryMerchantStore, StaticGeoLocator};
use qrmux::infrastructure::ip_api::IpApiGeoLocator;
use qrmux::interfaces::csv::decision_writer::DecisionWriter;
use qrmux::interfaces::csv::scan_reader::ScanReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input scans CSV file
    input: PathBuf,

    /// Merchant snapshot (JSON array of merchants with a `code` field)
    #[arg(long)]
    merchants: PathBuf,

    /// Base URL of the IP geolocation service
    #[arg(long)]
    geo_url: Option<String>,

    /// Budget for a single geolocation lookup, in milliseconds
    #[arg(long)]
    geo_timeout_ms: Option<u64>,

    /// Disable IP geolocation entirely
    #[arg(long)]
    no_geo: bool,

    /// Payment app to fall back on for mobile browsers (gpay, phonepe, paytm)
    #[arg(long)]
    default_provider: Option<PaymentProvider>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.geo_url {
            settings.geo_url = url.clone();
        }
        if let Some(ms) = self.geo_timeout_ms {
            settings.geo_timeout = Duration::from_millis(ms);
        }
        if self.no_geo {
            settings.geo_enabled = false;
        }
        if self.default_provider.is_some() {
            settings.default_provider = self.default_provider;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings().into_diagnostic()?;
    cli.apply(&mut settings);

    // Logs go to stderr; stdout carries the decision CSV.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .into_diagnostic()?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let snapshot = File::open(&cli.merchants).into_diagnostic()?;
    let store = InMemoryMerchantStore::from_reader(snapshot).into_diagnostic()?;

    let locator: GeoLocatorRef = if settings.geo_enabled {
        Arc::new(IpApiGeoLocator::new(&settings.geo_url, settings.geo_timeout).into_diagnostic()?)
    } else {
        tracing::info!("IP geolocation disabled");
        Arc::new(StaticGeoLocator::new())
    };
    let resolver = MerchantResolver::new(locator, settings.geo_timeout);
    let router = ScanRouter::new(Box::new(store), resolver)
        .with_default_provider(settings.default_provider);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = ScanReader::new(file);
    let stdout = io::stdout();
    let mut writer = DecisionWriter::new(stdout.lock());

    for scan in reader.scans() {
        match scan {
            Ok(request) => match router.route(&request).await {
                Ok(decision) => writer.write(&decision).into_diagnostic()?,
                Err(e) => tracing::error!(code = %request.code, error = %e, "Error routing scan"),
            },
            Err(e) => tracing::error!(error = %e, "Error reading scan"),
        }
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
