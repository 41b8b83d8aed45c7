//! The `subalert` daemon: configuration, HTTP clients, and the polling cycle.
//!
//! Chain storage is read through a JSON gateway, alerts are posted to
//! Twitter, and release and candidate data come from plain JSON feeds.

pub mod config;
pub mod daemon;
pub mod feeds;
pub mod gateway;
pub mod twitter;

pub use config::DaemonConfig;
pub use daemon::Daemon;
