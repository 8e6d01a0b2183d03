use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medledger_core::{CoreConfig, Dispatcher, MedicalRecordService, resolve_collection_config_path};
use medledger_shim::MemoryLedger;

/// Local transaction host for the medical record contract
///
/// Runs exactly one contract function as the given organisation against a ledger snapshot
/// on disk. The snapshot is only written back when the transaction succeeds, so a failed
/// invocation leaves no partial writes behind.
#[derive(Parser)]
#[command(name = "medledger-run")]
#[command(about = "Invoke a medical record contract function against a local ledger")]
struct Cli {
    /// Collection configuration file (JSON, or YAML for .yaml/.yml)
    #[arg(long, env = "MEDLEDGER_COLLECTION_CONFIG")]
    config: Option<PathBuf>,
    /// Ledger snapshot file, created on first successful write
    #[arg(long, env = "MEDLEDGER_STATE_FILE", default_value = "ledger_state.json")]
    state: PathBuf,
    /// MSP id of the submitting organisation
    #[arg(long, env = "MEDLEDGER_MSP_ID")]
    msp_id: String,
    /// Contract function, e.g. createMedicalData
    function: String,
    /// Function arguments
    args: Vec<String>,
}

/// Main entry point
///
/// # Environment Variables
/// - `MEDLEDGER_COLLECTION_CONFIG`: collection configuration path (default: `collection_config.json`)
/// - `MEDLEDGER_STATE_FILE`: ledger snapshot path (default: `ledger_state.json`)
/// - `MEDLEDGER_MSP_ID`: submitting organisation
/// - `RUST_LOG`: log filter, logs go to stderr
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medledger=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = resolve_collection_config_path(cli.config)?;
    let cfg = Arc::new(CoreConfig::load(&config_path)?);
    let dispatcher = Dispatcher::new(MedicalRecordService::new(cfg));

    let ledger = MemoryLedger::load_snapshot(&cli.state)?;
    let stub = ledger.transaction(cli.msp_id.as_str());

    tracing::info!("++ Invoking {} as {}", cli.function, cli.msp_id);

    match dispatcher.invoke(&stub, &cli.function, &cli.args) {
        Ok(payload) => {
            ledger.save_snapshot(&cli.state)?;
            if !payload.is_empty() {
                println!("{}", String::from_utf8_lossy(&payload));
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("{} failed: {}", cli.function, e);
            Err(e.into())
        }
    }
}
