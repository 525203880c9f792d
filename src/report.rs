use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use serde::Serialize;

use crate::engine::Measurement;
use crate::metrics::{bps_to_mbps, to_mb};
use crate::reader::TransferOutcome;
use crate::sampler::Sample;

/// Where observations end up. `progress` is driven from the renderer
/// thread, the rest from the measuring thread.
pub trait Reporter: Send {
    fn start(&mut self, url: &str) -> io::Result<()>;
    fn progress(&mut self, sample: &Sample) -> io::Result<()>;
    fn finish(&mut self, measurement: &Measurement) -> io::Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn start(&mut self, url: &str) -> io::Result<()> {
        (**self).start(url)
    }

    fn progress(&mut self, sample: &Sample) -> io::Result<()> {
        (**self).progress(sample)
    }

    fn finish(&mut self, measurement: &Measurement) -> io::Result<()> {
        (**self).finish(measurement)
    }
}

const BANNER: &str = "\t\t\t======================================\n\
                      \t\t\t               Speed Test             \n\
                      \t\t\t======================================";

pub fn format_progress(sample: &Sample) -> String {
    format!(
        "\r{:.2} MB downloaded - Speed: {:.2} MB/s",
        to_mb(sample.bytes),
        bps_to_mbps(sample.rate_bps)
    )
}

pub fn format_summary(m: &Measurement) -> String {
    let secs = m.elapsed.as_secs_f64();
    match m.average_bps() {
        Some(bps) => format!(
            "\n\nDownloaded {:.2} MB in {:.2} seconds\nAverage download speed: {:.2} MB/s",
            to_mb(m.bytes),
            secs,
            bps_to_mbps(bps)
        ),
        None => format!(
            "\n\nTransfer failed after {:.2} MB in {:.2} seconds",
            to_mb(m.bytes),
            secs
        ),
    }
}

/// Human-readable console output with an in-place progress line.
pub struct ConsoleReporter<W: Write + Send> {
    out: W,
    clear: bool,
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn start(&mut self, url: &str) -> io::Result<()> {
        if self.clear {
            execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        writeln!(self.out, "{BANNER}")?;
        writeln!(self.out, "\nTesting download speed from {url}...")?;
        self.out.flush()
    }

    fn progress(&mut self, sample: &Sample) -> io::Result<()> {
        write!(self.out, "{}", format_progress(sample))?;
        self.out.flush()
    }

    fn finish(&mut self, measurement: &Measurement) -> io::Result<()> {
        writeln!(self.out, "{}", format_summary(measurement))?;
        self.out.flush()
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    url: &'a str,
    outcome: &'static str,
    downloaded_bytes: u64,
    downloaded_mb: f64,
    elapsed_secs: f64,
    average_mb_per_sec: Option<f64>,
    error: Option<String>,
}

/// Prints only the final result, as a single JSON object.
pub struct JsonReporter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn start(&mut self, _url: &str) -> io::Result<()> {
        Ok(())
    }

    fn progress(&mut self, _sample: &Sample) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, m: &Measurement) -> io::Result<()> {
        let (outcome, error) = match &m.outcome {
            TransferOutcome::Completed => ("completed", None),
            TransferOutcome::Failed(e) => ("failed", Some(e.to_string())),
        };
        let result = JsonResult {
            url: &m.url,
            outcome,
            downloaded_bytes: m.bytes,
            downloaded_mb: to_mb(m.bytes),
            elapsed_secs: m.elapsed.as_secs_f64(),
            average_mb_per_sec: m.average_bps().map(bps_to_mbps),
            error,
        };
        serde_json::to_writer(&mut self.out, &result)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
