use crate::constants::{log_file_name, DAY_STAMP_FORMAT};
use crate::error::{EtlError, Result};
use chrono::Local;
use once_cell::sync::OnceCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{warn, Event, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt as tfmt, prelude::*, EnvFilter};

static INSTALLED: OnceCell<Logging> = OnceCell::new();

/// Handle to the process-wide logger: where the file sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logging {
    log_dir: PathBuf,
    log_file: PathBuf,
    file_sink: bool,
}

impl Logging {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// False when another global subscriber was already installed and
    /// events go there instead of to `log_file`.
    pub fn writes_file(&self) -> bool {
        self.file_sink
    }
}

/// `timestamp - target - LEVEL - message`
pub struct PipelineFormat;

impl<S, N> FormatEvent<S, N> for PipelineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{} - {} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            meta.target(),
            meta.level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Initializes logging with both console and file output.
///
/// The subscriber is installed once per process. Later calls return the
/// handle of the logger that is already running instead of stacking new sinks.
/// If the host application set its own global subscriber first, that one is
/// kept and the returned handle reports `writes_file() == false`.
pub fn init_logging(log_dir: impl AsRef<Path>) -> Result<Logging> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)?;

    let logging = INSTALLED.get_or_try_init(|| install(log_dir))?;
    if logging.log_dir() != log_dir {
        warn!(
            "Logging already initialized; still writing to {}",
            logging.log_file().display()
        );
    }
    Ok(logging.clone())
}

fn install(log_dir: &Path) -> Result<Logging> {
    let file_name = log_file_name(&Local::now().format(DAY_STAMP_FORMAT).to_string());

    // Plain append-mode file; the date is already part of the name
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.clone())
        .build(log_dir)
        .map_err(|e| EtlError::Logging(e.to_string()))?;

    let file_layer = tfmt::layer()
        .event_format(PipelineFormat)
        .with_ansi(false)
        .with_writer(file_appender);

    let console_layer = tfmt::layer()
        .event_format(PipelineFormat)
        .with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise INFO and above
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();
    if let Err(e) = &installed {
        warn!("Keeping the existing global subscriber: {}", e);
    }

    Ok(Logging {
        log_dir: log_dir.to_path_buf(),
        log_file: log_dir.join(file_name),
        file_sink: installed.is_ok(),
    })
}
