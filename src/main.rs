use std::process::ExitCode;

use clap::Parser;

use rgb_particles::{
    config::{Args, DemoConfig},
    demo, error_log,
};

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = DemoConfig::from(args);

    match demo::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error_log!("{}", e);
            ExitCode::FAILURE
        }
    }
}
