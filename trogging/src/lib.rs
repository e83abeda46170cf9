//! Log initialization and setup

#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::future_not_send,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

pub mod cli;
pub mod config;

pub use config::*;
pub use tracing_subscriber;

use std::io;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::ParseError,
    fmt::{self, MakeWriter, writer::BoxMakeWriter},
    registry::LookupSpan,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidLogFilter { filter: String, source: ParseError },

    #[error("Cannot set global tracing subscriber")]
    SetGlobalDefaultError(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The log layer produced by [`Builder::build`].
pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Builder for logging.
#[derive(Debug)]
pub struct Builder<W = fn() -> io::Stdout> {
    log_format: LogFormat,
    log_filter: Option<String>,
    // used when log_filter is none.
    default_log_filter: String,
    make_writer: W,
    with_target: bool,
    with_ansi: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Full,
            log_filter: None,
            default_log_filter: Self::DEFAULT_LOG_FILTER.to_string(),
            make_writer: io::stdout,
            with_target: true,
            with_ansi: true,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }
}

// This needs to be a separate impl block because they place different bounds on the type parameters.
impl<W> Builder<W> {
    pub const DEFAULT_LOG_FILTER: &'static str = "warn";

    pub fn with_writer<W2>(self, make_writer: W2) -> Builder<W2>
    where
        W2: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Builder::<W2> {
            make_writer,
            // cannot use `..self` because W type parameter changes
            log_format: self.log_format,
            log_filter: self.log_filter,
            default_log_filter: self.default_log_filter,
            with_target: self.with_target,
            with_ansi: self.with_ansi,
        }
    }

    /// Set log_filter using a simple numeric "verbosity level".
    ///
    /// 0 means, keep existing `log_filter` value.
    pub fn with_log_verbose_count(self, log_verbose_count: u8) -> Self {
        let log_filter = match log_verbose_count {
            0 => self.log_filter,
            1 => Some("info".to_string()),
            2 => Some("debug,mongodb=info".to_string()),
            _ => Some("trace,mongodb=debug".to_string()),
        };
        Self { log_filter, ..self }
    }

    pub fn with_log_filter(self, log_filter: &Option<String>) -> Self {
        Self {
            log_filter: log_filter.clone(),
            ..self
        }
    }

    pub fn with_default_log_filter(self, default_log_filter: impl Into<String>) -> Self {
        Self {
            default_log_filter: default_log_filter.into(),
            ..self
        }
    }

    pub fn with_log_format(self, log_format: LogFormat) -> Self {
        Self { log_format, ..self }
    }

    pub fn with_log_destination(self, log_destination: LogDestination) -> Builder<BoxMakeWriter> {
        let make_writer = match log_destination {
            LogDestination::Stdout => BoxMakeWriter::new(io::stdout),
            LogDestination::Stderr => BoxMakeWriter::new(io::stderr),
        };
        self.with_writer(make_writer)
    }

    /// Sets whether or not an event's target is displayed.
    ///
    /// Defaults to true.
    pub fn with_target(self, with_target: bool) -> Self {
        Self {
            with_target,
            ..self
        }
    }

    /// Enable/disable ANSI encoding for formatted events (i.e. colors).
    ///
    /// Defaults to true.
    pub fn with_ansi(self, with_ansi: bool) -> Self {
        Self { with_ansi, ..self }
    }
}

impl<W> Builder<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    /// Build the filtered log layer, to be added to a [`tracing_subscriber::Registry`].
    pub fn build<S>(self) -> Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let filter = self.log_filter.unwrap_or(self.default_log_filter);
        let filter = EnvFilter::try_new(&filter)
            .map_err(|source| Error::InvalidLogFilter { filter, source })?;

        let layer = fmt::layer()
            .with_writer(self.make_writer)
            .with_target(self.with_target)
            .with_ansi(self.with_ansi);

        Ok(match self.log_format {
            LogFormat::Full => layer.with_filter(filter).boxed(),
            LogFormat::Pretty => layer.pretty().with_filter(filter).boxed(),
            LogFormat::Json => layer.json().with_filter(filter).boxed(),
        })
    }
}

/// Install `subscriber` as the global default for all threads. Can only succeed once per
/// process.
pub fn install_global<S>(subscriber: S) -> Result<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_util {
    //! Utilities for testing logging.
    use super::*;

    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };
    use tracing::{debug, error, info, trace, warn};
    use tracing_subscriber::{Registry, layer::SubscriberExt};

    /// Log writer suitable for using in tests.
    /// It captures log output in a buffer and provides ways to filter out
    /// non-deterministic parts such as timestamps.
    #[derive(Default, Debug, Clone)]
    pub(crate) struct TestWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl TestWriter {
        /// Return a writer and reference to the to-be captured output.
        pub(crate) fn new() -> (Self, Captured) {
            let writer = Self::default();
            let captured = Captured(Arc::clone(&writer.buffer));
            (writer, captured)
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for TestWriter {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[derive(Debug)]
    pub(crate) struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        /// Removes non-determinism by removing the leading timestamp of each line.
        pub(crate) fn without_timestamps(&self) -> String {
            let timestamp =
                regex::Regex::new(r"(?m)^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z ").unwrap();
            timestamp.replace_all(&self.to_string(), "").to_string()
        }
    }

    impl std::fmt::Display for Captured {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let bytes = self.0.lock().unwrap();
            write!(f, "{}", std::str::from_utf8(&bytes).unwrap())
        }
    }

    /// Calls `f` with a subscriber built from `builder` (with test-friendly settings) as the
    /// default, and returns everything it logged.
    pub(crate) fn log_test<W, F>(builder: Builder<W>, f: F) -> Captured
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
        F: Fn(),
    {
        let (writer, output) = TestWriter::new();
        let layer = builder
            .with_writer(writer)
            .with_target(false)
            .with_ansi(false)
            .build()
            .expect("layer");
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, f);

        output
    }

    /// Emits one event per level and returns the captured output.
    pub(crate) fn simple_test<W>(builder: Builder<W>) -> Captured
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        log_test(builder, || {
            error!("foo");
            warn!("woo");
            info!("bar");
            debug!("baz");
            trace!("trax");
        })
    }
}
