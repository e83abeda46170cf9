//! Config for the tokio runtime that drives the driver and filesystem IO.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Tokio runtime type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TokioRuntimeType {
    /// Current-thread runtime.
    CurrentThread,

    /// Multi-thread runtime.
    #[default]
    MultiThread,
}

/// CLI config for the tokio IO runtime.
#[derive(Debug, Clone, clap::Parser)]
#[allow(missing_copy_implementations)]
pub struct TokioIoConfig {
    /// Set the maximum number of IO runtime threads to use.
    ///
    /// Defaults to the number of logical cores on the system.
    #[clap(
        id = "io_runtime_num_threads",
        long = "num-io-threads",
        env = "CLUSTERDUMP_NUM_IO_THREADS",
        action
    )]
    pub num_threads: Option<NonZeroUsize>,

    /// IO tokio runtime type.
    #[clap(
        id = "io_runtime_type",
        long = "io-runtime-type",
        env = "CLUSTERDUMP_IO_RUNTIME_TYPE",
        default_value_t = TokioRuntimeType::default(),
        value_enum,
        action
    )]
    pub runtime_type: TokioRuntimeType,
}

impl TokioIoConfig {
    /// Creates the tokio runtime builder.
    pub fn builder(&self) -> Result<tokio::runtime::Builder, std::io::Error> {
        // NOTE: no log macros will work here!
        //
        // That means use eprintln!() instead of error!() and so on. The subscriber is installed
        // after the runtime is built.

        let mut builder = match self.runtime_type {
            TokioRuntimeType::CurrentThread => tokio::runtime::Builder::new_current_thread(),
            TokioRuntimeType::MultiThread => {
                let mut builder = tokio::runtime::Builder::new_multi_thread();
                let num_threads = match self.num_threads {
                    None => std::thread::available_parallelism()?,
                    Some(n) => n,
                };
                builder.worker_threads(num_threads.get());
                builder
            }
        };

        builder.enable_time();
        builder.enable_io();

        let thread_counter = Arc::new(AtomicUsize::new(1));
        builder.thread_name_fn(move || {
            format!(
                "clusterdump Tokio IO {}",
                thread_counter.fetch_add(1, Ordering::SeqCst)
            )
        });

        Ok(builder)
    }
}
