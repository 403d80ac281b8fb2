use log::{error, info, LevelFilter};
use shapestage::app::{self, Options};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("shapestage::core::scheduler", LevelFilter::Info)
        .filter_module("shapestage::game", LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("shapestage starting...");
    let options = Options::from_args(std::env::args().skip(1));

    if let Err(e) = app::run(&options) {
        error!("shapestage exited with error: {}", e);
        return Err(e);
    }

    info!("shapestage exited gracefully.");
    Ok(())
}
