//! Tracing initialization

mod init_basic;

pub use init_basic::{default_filter, init_telemetry};
