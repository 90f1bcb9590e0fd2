//! sysglance: point-in-time system status for launchers and status bars.
//!
//! The core is the network status sampler: resolve the interface carrying
//! the default IPv4 route, classify it as wireless or wired, and estimate
//! upload/download throughput from two counter reads a fixed interval apart.
//! CPU, memory, disk, battery and uptime are read alongside through the same
//! [`SystemInfo`](system::SystemInfo) provider.
//!
//! ```no_run
//! use std::time::Duration;
//! use sysglance::system::{network::network_status, OsSystemInfo};
//!
//! let mut provider = OsSystemInfo::new();
//! let status = network_status(&mut provider, Duration::from_secs(1))?;
//! println!("{:?}", status);
//! # Ok::<(), sysglance::error::SampleError>(())
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod report;
pub mod system;

pub use error::{ConfigError, SampleError};
pub use format::format_bytes;
pub use system::collector::{Collector, Snapshot};
pub use system::link::{classify_link, LinkType};
pub use system::network::{network_status, InterfaceInfo, NetworkStatus};
pub use system::route::resolve_default_interface;
pub use system::throughput::{sample_throughput, ThroughputRate, ThroughputSample};
pub use system::{OsSystemInfo, SystemInfo};
