//! Gateway wiring used by the binary: configuration and the host side of the
//! point boundary.

pub mod config;
mod host;

pub use config::{GatewayConfig, PointConfig, TransportConfig};
pub use host::LoggingHost;
