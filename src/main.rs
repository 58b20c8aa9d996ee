use clap::Parser;
use log::error;
use vrc_announcer::config::Config;
use vrc_announcer::{init, logging, run, Cli};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(cli.log_level.unwrap_or(config.log_level)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let settings = match config.validate() {
        Ok(settings) => settings,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let clients = match init(&settings).await {
        Ok(clients) => clients,
        Err(e) => {
            error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(clients).await {
        error!("Bot stopped with an error: {}", e);
        std::process::exit(1);
    }
}
