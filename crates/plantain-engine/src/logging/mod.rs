//! Logger initialization.
//!
//! Engine code only uses the `log` macros; applications call
//! [`init_logging`] early in `main` to route them through `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
