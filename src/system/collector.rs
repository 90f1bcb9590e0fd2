use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::trace;

use super::battery::BatteryInfo;
use super::cpu::CpuInfo;
use super::disk::{find_mount, DiskInfo};
use super::memory::MemoryInfo;
use super::network::{network_status, NetworkStatus};
use super::SystemInfo;

/// Everything one invocation reports
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Local>,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    /// `None` when nothing is mounted at the configured mount point
    pub disk: Option<DiskInfo>,
    pub battery: Option<BatteryInfo>,
    pub uptime_seconds: u64,
    pub network: NetworkStatus,
}

/// Collects a [`Snapshot`] through a [`SystemInfo`] provider
pub struct Collector<P: SystemInfo> {
    provider: P,
    interval: Duration,
    mount_point: PathBuf,
    show_battery: bool,
}

impl<P: SystemInfo> Collector<P> {
    pub fn new(provider: P, interval: Duration, mount_point: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            interval,
            mount_point: mount_point.into(),
            show_battery: true,
        }
    }

    pub fn with_battery(mut self, show: bool) -> Self {
        self.show_battery = show;
        self
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Take one snapshot. Blocks for the sampling interval.
    pub fn collect(&mut self) -> Result<Snapshot> {
        // CPU usage is measured across the throughput sleep
        self.provider.mark_cpu_baseline();
        let network = network_status(&mut self.provider, self.interval)
            .context("sampling network throughput")?;
        trace!(?network, "network");

        let cpu = self.provider.cpu();
        trace!(usage = cpu.usage_percent, cores = cpu.logical_cores, "cpu");

        let memory = self.provider.memory();
        trace!(used = memory.used, total = memory.total, "memory");

        let disks = self.provider.disks();
        let disk = find_mount(&disks, &self.mount_point).cloned();
        trace!(mount = %self.mount_point.display(), found = disk.is_some(), "disk");

        let battery = if self.show_battery {
            self.provider.battery()
        } else {
            None
        };

        Ok(Snapshot {
            taken_at: Local::now(),
            cpu,
            memory,
            disk,
            battery,
            uptime_seconds: self.provider.uptime(),
            network,
        })
    }
}
