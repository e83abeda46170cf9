//! Building blocks for the [`clap`]-driven configuration of the `clusterdump` binary.

pub mod archive;
pub mod connection;
pub mod tokio;
