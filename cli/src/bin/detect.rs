//! detect - camera inference demo that only draws what it sees.

use std::process::ExitCode;

use clap::Parser;
use cli::{App, Args, Mode};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match App::from_env(&args).and_then(|mut app| app.run(Mode::Annotate)) {
        Ok(report) => {
            log::info!("processed {} frames", report.stats.frames);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
