//! Common CLI flags for logging
use crate::{Builder, config::*};
use tracing_subscriber::fmt::{MakeWriter, writer::BoxMakeWriter};

/// CLI config for the logging related subset of options.
#[derive(Debug, Clone, clap::Parser)]
pub struct LoggingConfig {
    /// Logs: filter directive
    ///
    /// Configures log severity level filter, by target.
    ///
    /// Simplest options: error, warn, info, debug, trace
    ///
    /// Levels for different modules can be specified. For example
    /// `debug,mongodb=info` specifies debug logging for everything except the
    /// database driver, which only displays info level logging.
    ///
    /// See <https://docs.rs/tracing-subscriber/0.3/tracing_subscriber/filter/struct.EnvFilter.html>
    /// for the full syntax.
    ///
    /// Overridden by `-v`.
    #[clap(long = "log-filter", env = "LOG_FILTER", global = true, action)]
    pub log_filter: Option<String>,

    /// Logs: filter short-hand
    ///
    /// Convenient way to set log severity level filter.
    /// Overrides `--log-filter`.
    ///
    /// -v   'info'
    ///
    /// -vv  'debug,mongodb=info'
    ///
    /// -vvv 'trace,mongodb=debug'
    #[clap(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        verbatim_doc_comment
    )]
    pub log_verbose_count: u8,

    /// Logs: destination
    ///
    /// Can be one of: stdout, stderr
    #[clap(
        long = "log-destination",
        env = "LOG_DESTINATION",
        default_value = "stdout",
        global = true,
        action
    )]
    pub log_destination: LogDestination,

    /// Logs: message format
    ///
    /// Can be one of:
    ///
    /// full: human-readable, single line
    ///
    /// pretty: human-readable, multi line
    ///
    /// json: machine-parseable, one object per line
    #[clap(
        long = "log-format",
        env = "LOG_FORMAT",
        default_value = "full",
        global = true,
        action,
        verbatim_doc_comment
    )]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    pub fn with_builder<W>(&self, builder: Builder<W>) -> Builder<BoxMakeWriter>
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        builder
            .with_log_filter(&self.log_filter)
            // after with_log_filter: -v overrides --log-filter
            .with_log_verbose_count(self.log_verbose_count)
            .with_log_destination(self.log_destination)
            .with_log_format(self.log_format)
    }
}

/// Extends the trogging [`crate::Builder`] API.
pub trait LoggingConfigBuilderExt {
    /// Applies all config entries from a [`LoggingConfig`] to a [`crate::Builder`].
    fn with_logging_config(self, config: &LoggingConfig) -> Builder<BoxMakeWriter>;
}

impl<W> LoggingConfigBuilderExt for Builder<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fn with_logging_config(self, config: &LoggingConfig) -> Builder<BoxMakeWriter> {
        config.with_builder(self)
    }
}
