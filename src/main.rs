use std::error::Error;
use std::io;
use std::path::Path;

use clap::Parser;
use cidr_merger::cmd::{self, Cli};
use cidr_merger::config::Settings;
use cidr_merger::logging::init_logging;

fn main() -> Result<(), Box<dyn Error>> {
    // Keep main thin, everything testable lives in the library.
    init_logging(Path::new("log4rs.yml"))?;
    dotenv::dotenv().ok();
    log::debug!("#Start main()");

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let output = cmd::run(&cli, &settings, &mut io::stdin().lock())?;
    println!("{output}");
    Ok(())
}
