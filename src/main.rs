use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use blocktally::config::AppConfig;
use blocktally::driver;
use blocktally::metrics;
use blocktally::rpc::HttpBlockProvider;
use blocktally::telemetry::{init_tracing, TelemetryConfig};
use blocktally::types::TallyError;

#[derive(Parser, Debug)]
#[clap(name = "blocktally", version)]
#[clap(about = "Count the transactions of the block named in custom.in and write the count to custom.out", long_about = None)]
struct Args {
    /// Provider host (JSON-RPC on port 8545 unless configured otherwise)
    host: Option<String>,
}

async fn execute(config: &AppConfig) -> Result<(), TallyError> {
    let provider = HttpBlockProvider::new(&config.rpc)?;
    info!(
        provider = provider.url(),
        input = %config.paths.input_path().display(),
        "Starting tally"
    );

    let result = driver::run(config, &provider).await?;
    info!(
        height = %result.height,
        transactions = result.count.0,
        "Tally complete"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (tracing_ready, _log_guard) = match init_tracing(TelemetryConfig::default()) {
        Ok(guard) => (true, guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            (false, None)
        }
    };

    if let Err(e) = metrics::init_metrics() {
        warn!(error = %e, "Metrics registration failed");
    }

    let outcome = match AppConfig::load(args.host.as_deref()) {
        Ok(config) => {
            let outcome = execute(&config).await;
            if let Some(path) = config.metrics.textfile_path() {
                if let Err(e) = metrics::write_textfile(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to write metrics textfile");
                }
            }
            outcome
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if tracing_ready {
                error!(error = %e, "Tally failed");
            } else {
                eprintln!("Tally failed: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
