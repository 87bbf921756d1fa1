//! Run, batch and file configuration.
//!
//! Every parameter that shapes a protocol run lives here and is
//! validated up front. Invalid configuration is fatal and never retried.

mod file;
mod run;

pub use file::{AmplificationConfig, BatchConfig, FileConfig};
pub use run::{ConfigError, RunConfig, DEFAULT_SECURITY_THRESHOLD, MAX_SECURITY_THRESHOLD};
