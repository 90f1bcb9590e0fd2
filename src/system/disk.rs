use std::path::{Path, PathBuf};

use serde::Serialize;

use super::memory::percent_of;

/// Usage of the filesystem mounted at `mount_point`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskInfo {
    pub mount_point: PathBuf,
    pub total: u64,     // bytes
    pub available: u64, // bytes
}

impl DiskInfo {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }

    pub fn percent(&self) -> f64 {
        percent_of(self.used(), self.total)
    }
}

/// Pick the disk mounted exactly at `mount_point`
pub fn find_mount<'a>(disks: &'a [DiskInfo], mount_point: &Path) -> Option<&'a DiskInfo> {
    disks.iter().find(|d| d.mount_point == mount_point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(mount: &str, total: u64, available: u64) -> DiskInfo {
        DiskInfo {
            mount_point: PathBuf::from(mount),
            total,
            available,
        }
    }

    #[test]
    fn used_and_percent() {
        let d = disk("/", 200, 50);
        assert_eq!(d.used(), 150);
        assert_eq!(d.percent(), 75.0);
    }

    #[test]
    fn finds_exact_mount() {
        let disks = vec![disk("/boot", 1, 1), disk("/", 2, 1), disk("/home", 3, 1)];
        assert_eq!(find_mount(&disks, Path::new("/")).map(|d| d.total), Some(2));
        assert!(find_mount(&disks, Path::new("/mnt")).is_none());
    }
}
