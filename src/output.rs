use std::io::{self, Write};

use serde::Serialize;

use crate::app::RunResult;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, _event: crate::app::ProgressEvent) {}
}

/// Forwards progress events to the tracing subscriber, for runs where
/// stderr logging is the only observability surface.
pub struct LogSink;

impl crate::app::ProgressSink for LogSink {
    fn event(&self, event: crate::app::ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => tracing::info!(elapsed_secs = elapsed.as_secs_f64(), "{}", event.message),
            None => tracing::info!("{}", event.message),
        }
    }
}
