//! Cardbox Node - card collection HTTP service.

use cardbox_node::config::Config;
use cardbox_node::lifecycle::{Server, ShutdownSignal, EXIT_CONFIG};
use cardbox_node::observability::{init_logging, LogFormat};
use clap::Parser;
use std::path::PathBuf;

/// Cardbox Node - stores cards in a document database
#[derive(Parser, Debug)]
#[command(name = "cardbox-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address
    #[arg(long)]
    listen_addr: Option<String>,

    /// Store URI (mongodb://, mongodb+srv:// or memory://)
    #[arg(long)]
    store_uri: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(addr) = self.listen_addr {
            config.http.listen_addr = addr;
        }
        if let Some(uri) = self.store_uri {
            config.store.uri = uri;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if let Some(format) = self.log_format {
            config.log.format = LogFormat::parse(&format);
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cardbox-node: {e}");
            std::process::exit(EXIT_CONFIG);
        }
    };
    args.apply(&mut config);
    if let Err(e) = config.check() {
        eprintln!("cardbox-node: {e}");
        std::process::exit(EXIT_CONFIG);
    }

    init_logging(&config.log.level, config.log.format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Cardbox node");
    tracing::info!(
        listen_addr = %config.http.listen_addr,
        database = %config.store.database,
        collection = %config.store.collection,
        "Node configuration"
    );

    let shutdown = ShutdownSignal::with_os_signals();
    if let Err(e) = Server::new(config).run(shutdown).await {
        tracing::error!(error = %e, "Cardbox node stopped");
        std::process::exit(e.exit_code());
    }

    tracing::info!("Cardbox node stopped");
}
