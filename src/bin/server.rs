//! Tourbase server binary

use tourbase::cli::{commands, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tourbase=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse_args();
    if let Err(e) = commands::run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
