//! Wireless vs wired classification of a network interface.
//!
//! Where the provider exposes a per-interface attribute tree (Linux sysfs),
//! the presence of the wireless marker decides. Elsewhere the interface name
//! is matched against a keyword list. The name heuristic is best effort: a
//! wired interface called "wifi-bridge" is reported as wireless, and a
//! wireless adapter with a vendor name lacking the keywords as wired.

use serde::Serialize;
use tracing::trace;

use super::SystemInfo;

const WIRELESS_KEYWORDS: [&str; 3] = ["wlan", "wifi", "wireless"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkType {
    Wireless,
    Wired,
    Unknown,
}

impl LinkType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Wireless => "Wi-Fi",
            Self::Wired => "Ethernet",
            Self::Unknown => "Unknown",
        }
    }
}

/// Classify `interface` using the attribute tree when available, the name
/// heuristic otherwise.
pub fn classify_link<P: SystemInfo + ?Sized>(provider: &P, interface: &str) -> LinkType {
    match provider.wireless_marker(interface) {
        Some(true) => LinkType::Wireless,
        Some(false) => LinkType::Wired,
        None => {
            trace!(interface, "no attribute tree, using name heuristic");
            classify_by_name(interface)
        }
    }
}

/// Case-insensitive keyword match on the interface name
pub fn classify_by_name(interface: &str) -> LinkType {
    let lower = interface.to_lowercase();
    if WIRELESS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        LinkType::Wireless
    } else {
        LinkType::Wired
    }
}
