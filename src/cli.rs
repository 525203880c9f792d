use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// URL of the resource to download
    pub url: String,

    /// Sampling cadence for live progress, in milliseconds
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: u64,

    /// Working buffer size for each read, in bytes
    #[arg(long, default_value_t = 32 * 1024, value_parser = parse_buffer_size)]
    pub buffer_size: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Do not clear the terminal before printing the banner
    #[arg(long)]
    pub no_clear: bool,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_buffer_size(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        return Err("buffer size must be at least 1 byte".into());
    }
    Ok(n)
}
