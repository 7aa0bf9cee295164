//! Demo server: one route rendering a greeting for a random name.

use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;

use lei::config::load_config;
use lei::observability::{logging::init_logging, metrics::init_metrics};
use lei::{Controller, Engine, LeiConfig, Model, ModelError, RequestContext, ResponseDescriptor, Route, View};

const RANDOM_NAMES: &[&str] = &[
    "Josh", "Rebecca", "John", "Hannah", "Ostra", "Lana", "Laura", "Lara", "Brian", "Ed", "Mark",
    "Jeff", "Bell",
];

#[derive(Parser, Debug)]
#[command(name = "lei", version, about = "Lei demo server")]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration.
    #[arg(short, long)]
    port: Option<u16>,

    /// Template rendered by the index route.
    #[arg(long, default_value = "views/index.html")]
    view: PathBuf,
}

struct IndexModel;

#[async_trait]
impl Model for IndexModel {
    async fn run(&self, _ctx: &RequestContext) -> Result<ResponseDescriptor, ModelError> {
        let name = RANDOM_NAMES[fastrand::usize(..RANDOM_NAMES.len())];
        Ok(ResponseDescriptor::new().data("name", name))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LeiConfig::default(),
    };

    init_logging(&config.observability)?;
    tracing::info!("lei v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut engine = Engine::new(config)?;
    let controller = Controller::new(View::new(cli.view), IndexModel);
    engine.add_route(Route::get("index", "/", controller))?;

    engine.run(cli.port).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
