use std::time::Duration;

use serde::Serialize;

use super::link::{classify_link, LinkType};
use super::route::resolve_default_interface;
use super::throughput::{sample_throughput, ThroughputRate};
use super::SystemInfo;
use crate::error::SampleError;

/// The interface carrying the default route and its link type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub link_type: LinkType,
}

/// Network status: default interface (if any) plus throughput over one interval
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkStatus {
    /// `None` when there is no default route
    pub interface: Option<InterfaceInfo>,
    pub rate: ThroughputRate,
}

impl NetworkStatus {
    pub fn link_type(&self) -> LinkType {
        self.interface
            .as_ref()
            .map(|i| i.link_type)
            .unwrap_or(LinkType::Unknown)
    }
}

/// Resolve the default interface of the current host.
pub fn default_interface<P: SystemInfo + ?Sized>(provider: &P) -> Option<InterfaceInfo> {
    resolve_default_interface(provider).map(|name| {
        let link_type = classify_link(provider, &name);
        InterfaceInfo { name, link_type }
    })
}

/// Sample throughput, then resolve and classify the default interface.
/// Blocks for `interval`.
pub fn network_status<P: SystemInfo + ?Sized>(
    provider: &mut P,
    interval: Duration,
) -> Result<NetworkStatus, SampleError> {
    let rate = sample_throughput(provider, interval)?;
    Ok(NetworkStatus {
        interface: default_interface(&*provider),
        rate,
    })
}
