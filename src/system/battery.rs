//! Battery charge and charging state.
//!
//! Backends:
//!   - Linux: power-supply class (`/sys/class/power_supply`)
//!   - Windows: `GetSystemPowerStatus` from kernel32.dll
//!   - macOS: `pmset -g batt`
//!
//! Other platforms report no battery.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryState {
    Charging,
    Discharging,
    Full,
    Unknown,
}

impl BatteryState {
    fn parse(status: &str) -> Self {
        match status.trim() {
            "Charging" => Self::Charging,
            "Discharging" | "Not charging" => Self::Discharging,
            "Full" => Self::Full,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Charging => "charging",
            Self::Discharging => "discharging",
            Self::Full => "full",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryInfo {
    pub percent: f32,
    pub state: BatteryState,
}

/// First battery found under `<sysfs_root>/class/power_supply`, or `None`
/// when the directory is missing or holds no battery (desktops, AC only).
pub fn read_power_supply(sysfs_root: &Path) -> Option<BatteryInfo> {
    let class_dir = sysfs_root.join("class").join("power_supply");
    let mut supplies: Vec<_> = fs::read_dir(&class_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    supplies.sort();

    supplies.iter().find_map(|dir| {
        let kind = fs::read_to_string(dir.join("type")).ok()?;
        if kind.trim() != "Battery" {
            return None;
        }
        let percent = fs::read_to_string(dir.join("capacity"))
            .ok()?
            .trim()
            .parse::<f32>()
            .ok()?;
        let state = fs::read_to_string(dir.join("status"))
            .map(|s| BatteryState::parse(&s))
            .unwrap_or(BatteryState::Unknown);
        trace!(supply = %dir.display(), percent, "battery");
        Some(BatteryInfo {
            percent: percent.clamp(0.0, 100.0),
            state,
        })
    })
}

// ─── Windows ─────────────────────────────────────────────────────────────────

const AC_LINE_OFFLINE: u8 = 0;
const AC_LINE_ONLINE: u8 = 1;
const BATTERY_FLAG_CHARGING: u8 = 0x08;
const BATTERY_FLAG_NO_BATTERY: u8 = 0x80;
const BATTERY_FLAG_UNKNOWN: u8 = 0xFF;
const BATTERY_PERCENT_UNKNOWN: u8 = 0xFF;

/// Map the fields of a Win32 `SYSTEM_POWER_STATUS` to a battery reading.
/// `None` when the system has no battery or the charge is unknown.
pub fn from_power_status(ac_line_status: u8, battery_flag: u8, percent: u8) -> Option<BatteryInfo> {
    if battery_flag == BATTERY_FLAG_UNKNOWN
        || battery_flag & BATTERY_FLAG_NO_BATTERY != 0
        || percent == BATTERY_PERCENT_UNKNOWN
    {
        return None;
    }

    let state = if battery_flag & BATTERY_FLAG_CHARGING != 0 {
        BatteryState::Charging
    } else {
        match ac_line_status {
            AC_LINE_OFFLINE => BatteryState::Discharging,
            AC_LINE_ONLINE if percent >= 100 => BatteryState::Full,
            _ => BatteryState::Unknown,
        }
    };

    Some(BatteryInfo {
        percent: f32::from(percent.min(100)),
        state,
    })
}

#[cfg(windows)]
mod win {
    use super::{from_power_status, BatteryInfo};

    #[repr(C)]
    #[allow(non_snake_case, non_camel_case_types, dead_code)]
    struct SYSTEM_POWER_STATUS {
        ACLineStatus: u8,
        BatteryFlag: u8,
        BatteryLifePercent: u8,
        SystemStatusFlag: u8,
        BatteryLifeTime: u32,
        BatteryFullLifeTime: u32,
    }

    #[link(name = "kernel32")]
    extern "system" {
        fn GetSystemPowerStatus(lpSystemPowerStatus: *mut SYSTEM_POWER_STATUS) -> i32;
    }

    pub fn power_status() -> Option<BatteryInfo> {
        unsafe {
            let mut status: SYSTEM_POWER_STATUS = std::mem::zeroed();
            if GetSystemPowerStatus(&mut status) == 0 {
                return None;
            }
            from_power_status(status.ACLineStatus, status.BatteryFlag, status.BatteryLifePercent)
        }
    }
}

// ─── macOS ───────────────────────────────────────────────────────────────────

/// Parse the output of `pmset -g batt`:
///
/// ```text
/// Now drawing from 'Battery Power'
///  -InternalBattery-0 (id=4653155)	85%; discharging; 4:12 remaining present: true
/// ```
///
/// Machines without an internal battery print only the first line.
pub fn parse_pmset(output: &str) -> Option<BatteryInfo> {
    let line = output.lines().find(|l| l.contains("InternalBattery"))?;
    let mut fields = line.split(';');

    let percent = fields
        .next()?
        .split_whitespace()
        .last()?
        .trim_end_matches('%')
        .parse::<f32>()
        .ok()?;
    let state = match fields.next().map(str::trim) {
        Some("charging") | Some("finishing charge") => BatteryState::Charging,
        Some("discharging") => BatteryState::Discharging,
        Some("charged") => BatteryState::Full,
        _ => BatteryState::Unknown,
    };

    Some(BatteryInfo {
        percent: percent.clamp(0.0, 100.0),
        state,
    })
}

// ─── Platform dispatch ───────────────────────────────────────────────────────

/// Battery of the running host. `sysfs_root` is only read on Linux.
#[cfg(target_os = "linux")]
pub fn os_battery(sysfs_root: &Path) -> Option<BatteryInfo> {
    read_power_supply(sysfs_root)
}

#[cfg(windows)]
pub fn os_battery(_sysfs_root: &Path) -> Option<BatteryInfo> {
    win::power_status()
}

#[cfg(target_os = "macos")]
pub fn os_battery(_sysfs_root: &Path) -> Option<BatteryInfo> {
    let output = std::process::Command::new("pmset")
        .args(["-g", "batt"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_pmset(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(any(target_os = "linux", windows, target_os = "macos")))]
pub fn os_battery(_sysfs_root: &Path) -> Option<BatteryInfo> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply(root: &Path, name: &str, kind: &str, capacity: Option<&str>, status: Option<&str>) {
        let dir = root.join("class").join("power_supply").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), format!("{}\n", kind)).unwrap();
        if let Some(c) = capacity {
            fs::write(dir.join("capacity"), format!("{}\n", c)).unwrap();
        }
        if let Some(s) = status {
            fs::write(dir.join("status"), format!("{}\n", s)).unwrap();
        }
    }

    #[test]
    fn reads_first_battery() {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "AC", "Mains", None, None);
        supply(root.path(), "BAT0", "Battery", Some("81"), Some("Charging"));

        let battery = read_power_supply(root.path()).unwrap();
        assert_eq!(battery.percent, 81.0);
        assert_eq!(battery.state, BatteryState::Charging);
    }

    #[test]
    fn missing_status_is_unknown() {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "BAT1", "Battery", Some("40"), None);
        assert_eq!(read_power_supply(root.path()).unwrap().state, BatteryState::Unknown);
    }

    #[test]
    fn no_battery() {
        let root = tempfile::tempdir().unwrap();
        supply(root.path(), "AC", "Mains", None, None);
        assert!(read_power_supply(root.path()).is_none());
        assert!(read_power_supply(&root.path().join("absent")).is_none());
    }

    #[test]
    fn power_status_states() {
        let charging = from_power_status(AC_LINE_ONLINE, BATTERY_FLAG_CHARGING, 57).unwrap();
        assert_eq!(charging.percent, 57.0);
        assert_eq!(charging.state, BatteryState::Charging);

        // High (1) battery flag, on battery power
        let discharging = from_power_status(AC_LINE_OFFLINE, 0x01, 90).unwrap();
        assert_eq!(discharging.state, BatteryState::Discharging);

        let full = from_power_status(AC_LINE_ONLINE, 0x01, 100).unwrap();
        assert_eq!(full.state, BatteryState::Full);

        // Plugged in, not charging, not full
        let held = from_power_status(AC_LINE_ONLINE, 0x00, 80).unwrap();
        assert_eq!(held.state, BatteryState::Unknown);

        let unknown_line = from_power_status(0xFF, 0x02, 10).unwrap();
        assert_eq!(unknown_line.state, BatteryState::Unknown);
    }

    #[test]
    fn power_status_without_battery() {
        assert!(from_power_status(AC_LINE_ONLINE, BATTERY_FLAG_NO_BATTERY, 255).is_none());
        assert!(from_power_status(AC_LINE_ONLINE, BATTERY_FLAG_UNKNOWN, 50).is_none());
        assert!(from_power_status(AC_LINE_OFFLINE, 0x01, BATTERY_PERCENT_UNKNOWN).is_none());
    }

    #[test]
    fn parses_pmset_battery() {
        let output = "Now drawing from 'Battery Power'\n \
                      -InternalBattery-0 (id=4653155)\t85%; discharging; 4:12 remaining present: true\n";
        let battery = parse_pmset(output).unwrap();
        assert_eq!(battery.percent, 85.0);
        assert_eq!(battery.state, BatteryState::Discharging);

        let charged = parse_pmset(" -InternalBattery-0 (id=1)\t100%; charged; 0:00 remaining present: true").unwrap();
        assert_eq!(charged.state, BatteryState::Full);

        let charging = parse_pmset(" -InternalBattery-0 (id=1)\t42%; charging; 1:10 remaining present: true").unwrap();
        assert_eq!(charging.state, BatteryState::Charging);
    }

    #[test]
    fn pmset_without_internal_battery() {
        assert!(parse_pmset("Now drawing from 'AC Power'\n").is_none());
    }
}
