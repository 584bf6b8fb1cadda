//! turret - aim two servos at a lone detected object and fire the relay
//! once it has stayed in view for a couple of seconds.

use std::process::ExitCode;

use clap::Parser;
use cli::{App, Args, Mode};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match App::from_env(&args).and_then(|mut app| app.run(Mode::Turret)) {
        Ok(report) => {
            log::info!(
                "processed {} frames, {} detections, {} shots",
                report.stats.frames,
                report.stats.detections,
                report.shots
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
