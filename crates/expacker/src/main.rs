#![allow(clippy::cargo_common_metadata)]

use std::process::ExitCode;

use clap::Parser;

use expacker_utils::fmt::Label;

pub(crate) mod cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true)
        .init();

    // Usage errors go to stdout with a failure status, help and version with success
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            println!("{err}");
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match cli.run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}\n{err:?}", Label::Error);
            ExitCode::FAILURE
        }
    }
}
