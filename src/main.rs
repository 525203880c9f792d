mod cli;
mod clock;
mod engine;
mod error;
mod metrics;
#[cfg(test)]
mod mock;
mod reader;
mod report;
mod sampler;
mod state;
mod transport;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::engine::run_speedtest;
use crate::error::SpeedtestError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        // stdout carries the in-place progress line
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    // exits with a usage message when the URL is missing
    let cli = Cli::parse();
    let result: Result<()> = run_speedtest(cli);

    if let Err(err) = result {
        let code = exit_code_for_error(&err);
        eprintln!("error: {err:?}");
        std::process::exit(code);
    }
}

pub(crate) fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    // 2: usage (clap), 3: request failed, 4: read failed mid-transfer, 1: other
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<SpeedtestError>() {
            return match e {
                SpeedtestError::Request { .. } => 3,
                SpeedtestError::Read { .. } => 4,
                SpeedtestError::Client(_) => 1,
            };
        }
    }
    1
}
