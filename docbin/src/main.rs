use clap::Parser;
use tracing::error;

use docbin::{config::Config, logging};

#[tokio::main]
async fn main() {
    let config = Config::parse();
    logging::init_tracing(config.log_json, config.verbose);

    if let Err(e) = docbin::run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
