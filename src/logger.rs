use crate::Result;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

/// Toggle for the console log sink.
///
/// Shared between the installed subscriber and every `ConsoleIo`, so a `--quiet`
/// run can silence log echoes on stderr while the file log keeps recording.
#[derive(Debug, Clone)]
pub struct LogSwitch(Arc<AtomicBool>);

impl LogSwitch {
    pub fn new(enabled: bool) -> Self {
        LogSwitch(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for LogSwitch {
    fn default() -> Self {
        LogSwitch::new(true)
    }
}

pub fn system_logger(dir: Option<&Path>, log_level: &str, switch: &LogSwitch) -> Result<()> {
    // JSON file layer, only when a log directory is configured
    let file_layer = match dir {
        Some(dir) => {
            let file = File::create(dir.join("taskshell.log"))?;
            Some(
                Layer::new()
                    .json()
                    .with_writer(file)
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(false)
                    .with_span_events(FmtSpan::CLOSE),
            )
        }
        None => None,
    };

    // Console layer gated by the switch
    let console_switch = switch.clone();
    let console_layer = Layer::new()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(filter_fn(move |_| console_switch.is_enabled()));

    let filter_layer = EnvFilter::new(log_level);

    let subscriber = Registry::default()
        .with(file_layer)
        .with(console_layer)
        .with(filter_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!("Tracing set up.");

    Ok(())
}
