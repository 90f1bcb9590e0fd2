//! OS access behind the [`SystemInfo`] provider trait.
//!
//! Every read the sampler and collector perform goes through this trait, so
//! tests can substitute synthetic routing tables, counters and clocks.

pub mod battery;
pub mod collector;
pub mod cpu;
pub mod disk;
pub mod link;
pub mod memory;
pub mod network;
pub mod route;
pub mod throughput;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use sysinfo::{Disks, Networks, System};

use self::battery::BatteryInfo;
use self::cpu::CpuInfo;
use self::disk::DiskInfo;
use self::memory::MemoryInfo;
use self::route::RouteEntry;
use self::throughput::ByteCounters;

/// Source of system state
pub trait SystemInfo {
    /// IPv4 routing table
    fn routes(&self) -> io::Result<Vec<RouteEntry>>;

    /// Whether `interface` carries a wireless marker in the per-interface
    /// attribute tree. `None` when the platform has no such tree.
    fn wireless_marker(&self, interface: &str) -> Option<bool>;

    /// Cumulative sent/received byte counters
    fn byte_counters(&mut self) -> ByteCounters;

    /// Start a CPU usage window; the next [`cpu`](Self::cpu) reports usage
    /// since this call
    fn mark_cpu_baseline(&mut self) {}

    fn cpu(&mut self) -> CpuInfo;
    fn memory(&mut self) -> MemoryInfo;
    fn disks(&mut self) -> Vec<DiskInfo>;
    fn battery(&self) -> Option<BatteryInfo>;
    fn uptime(&self) -> u64;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Real provider backed by `sysinfo`, procfs and sysfs
pub struct OsSystemInfo {
    sys: System,
    networks: Networks,
    procfs_root: PathBuf,
    sysfs_root: PathBuf,
}

impl OsSystemInfo {
    pub fn new() -> Self {
        Self::with_roots("/proc", "/sys")
    }

    /// Provider reading procfs and sysfs from alternate roots
    pub fn with_roots(procfs_root: impl Into<PathBuf>, sysfs_root: impl Into<PathBuf>) -> Self {
        let mut sys = System::new();
        // Baseline for the first CPU usage delta
        sys.refresh_cpu_usage();

        Self {
            sys,
            networks: Networks::new_with_refreshed_list(),
            procfs_root: procfs_root.into(),
            sysfs_root: sysfs_root.into(),
        }
    }
}

impl Default for OsSystemInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInfo for OsSystemInfo {
    fn routes(&self) -> io::Result<Vec<RouteEntry>> {
        route::os_routes(&self.procfs_root)
    }

    fn wireless_marker(&self, interface: &str) -> Option<bool> {
        let class_net = self.sysfs_root.join("class").join("net");
        if !class_net.is_dir() {
            return None;
        }
        let iface = class_net.join(interface);
        Some(iface.join("wireless").is_dir() || iface.join("phy80211").exists())
    }

    fn byte_counters(&mut self) -> ByteCounters {
        // true = drop interfaces that disappeared since the last refresh
        self.networks.refresh(true);

        sum_counters(
            self.networks
                .iter()
                .map(|(name, data)| (name.as_str(), data.total_transmitted(), data.total_received())),
        )
    }

    fn mark_cpu_baseline(&mut self) {
        self.sys.refresh_cpu_usage();
    }

    fn cpu(&mut self) -> CpuInfo {
        self.sys.refresh_cpu_usage();
        let cpus = self.sys.cpus();
        let per_core: Vec<f32> = cpus.iter().map(|c| c.cpu_usage()).collect();
        let brand = cpus.first().map(|c| c.brand().trim().to_string()).unwrap_or_default();
        CpuInfo::from_cores(brand, &per_core)
    }

    fn memory(&mut self) -> MemoryInfo {
        self.sys.refresh_memory();
        MemoryInfo {
            total: self.sys.total_memory(),
            used: self.sys.used_memory(),
        }
    }

    fn disks(&mut self) -> Vec<DiskInfo> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .map(|d| DiskInfo {
                mount_point: d.mount_point().to_path_buf(),
                total: d.total_space(),
                available: d.available_space(),
            })
            .collect()
    }

    fn battery(&self) -> Option<BatteryInfo> {
        battery::os_battery(&self.sysfs_root)
    }

    fn uptime(&self) -> u64 {
        System::uptime()
    }
}

/// Loopback traffic never leaves the host and is excluded from throughput
pub fn is_loopback(interface: &str) -> bool {
    interface == "lo" || interface == "lo0" || interface.to_lowercase().starts_with("loopback")
}

/// Sum `(interface, sent, received)` counters, skipping loopback
pub fn sum_counters<'a, I>(interfaces: I) -> ByteCounters
where
    I: IntoIterator<Item = (&'a str, u64, u64)>,
{
    interfaces
        .into_iter()
        .filter(|(name, _, _)| !is_loopback(name))
        .fold(ByteCounters::default(), |acc, (_, sent, received)| ByteCounters {
            sent: acc.sent.saturating_add(sent),
            received: acc.received.saturating_add(received),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loopback_names() {
        assert!(is_loopback("lo"));
        assert!(is_loopback("lo0"));
        assert!(is_loopback("Loopback Pseudo-Interface 1"));
        assert!(!is_loopback("eth0"));
        assert!(!is_loopback("long0"));
    }

    #[test]
    fn counters_skip_loopback() {
        let counters = sum_counters([
            ("lo", 9_000, 9_000),
            ("eth0", 100, 200),
            ("wlan0", 10, 20),
            ("Loopback Pseudo-Interface 1", 5, 5),
        ]);
        assert_eq!(counters, ByteCounters { sent: 110, received: 220 });
        assert_eq!(sum_counters([("lo", 1, 1)]), ByteCounters::default());
    }

    #[test]
    fn wireless_marker_from_attribute_tree() {
        let sysfs = tempfile::tempdir().unwrap();
        let net = sysfs.path().join("class").join("net");
        fs::create_dir_all(net.join("wlp2s0").join("wireless")).unwrap();
        fs::create_dir_all(net.join("enp3s0")).unwrap();

        let provider = OsSystemInfo::with_roots("/proc", sysfs.path());
        assert_eq!(provider.wireless_marker("wlp2s0"), Some(true));
        assert_eq!(provider.wireless_marker("enp3s0"), Some(false));
    }

    #[test]
    fn no_attribute_tree() {
        let sysfs = tempfile::tempdir().unwrap();
        let provider = OsSystemInfo::with_roots("/proc", sysfs.path());
        assert_eq!(provider.wireless_marker("wlan0"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn routes_from_procfs_root() {
        let procfs = tempfile::tempdir().unwrap();
        fs::create_dir_all(procfs.path().join("net")).unwrap();
        fs::write(
            procfs.path().join("net").join("route"),
            "Iface\tDestination\tGateway\tFlags\tRefCnt\tUse\tMetric\tMask\tMTU\tWindow\tIRTT\n\
             eth0\t00000000\t0102A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0\n",
        )
        .unwrap();

        let provider = OsSystemInfo::with_roots(procfs.path(), "/sys");
        assert_eq!(
            route::resolve_default_interface(&provider).as_deref(),
            Some("eth0")
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_route_file_is_no_route() {
        let procfs = tempfile::tempdir().unwrap();
        let provider = OsSystemInfo::with_roots(procfs.path(), "/sys");
        assert_eq!(route::resolve_default_interface(&provider), None);
    }
}
