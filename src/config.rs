//! sysglance configuration persistence (htoprc-style key=value format)
//!
//! Looks for `sysglancerc` under `$XDG_CONFIG_HOME/sysglance`,
//! `~/.config/sysglance`, or `%APPDATA%\sysglance` on Windows.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConfigError, SampleError};
use crate::system::throughput::interval_from_secs;

const MIN_INTERVAL_SECS: f64 = 0.2;
const MAX_INTERVAL_SECS: f64 = 10.0;
const MIN_WATCH_SECS: f64 = 0.0;
const MAX_WATCH_SECS: f64 = 3600.0;

/// Default config file path for the current platform
pub fn config_path() -> Option<PathBuf> {
    let dir = if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
    };
    dir.map(|d| d.join("sysglance").join("sysglancerc"))
}

/// Persistable settings
#[derive(Debug, Clone, PartialEq)]
pub struct GlanceConfig {
    /// Gap between the two counter reads of one throughput sample
    pub interval_secs: f64,
    /// Mount point reported in the disk line
    pub mount_point: PathBuf,
    pub show_battery: bool,
    /// Extra pause between snapshots in watch mode
    pub watch_every_secs: f64,
}

impl Default for GlanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1.0,
            mount_point: default_mount_point(),
            show_battery: true,
            watch_every_secs: 2.0,
        }
    }
}

fn default_mount_point() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}

impl GlanceConfig {
    /// Load config from `path` (or the default location), returning defaults
    /// if the file doesn't exist
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(config_path) {
            Some(p) => p,
            None => return Self::default(),
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded config");
                Self::parse(&content)
            }
            Err(e) => {
                debug!(path = %path.display(), "no config file: {}", e);
                Self::default()
            }
        }
    }

    /// Parse key=value lines. Unknown keys are ignored, bad values keep the
    /// default.
    pub fn parse(content: &str) -> Self {
        let mut cfg = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("ignoring config line without '=': {}", line);
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "interval_secs" => match value.parse::<f64>() {
                    Ok(v) if v.is_finite() => cfg.interval_secs = clamp_interval(v),
                    _ => warn!("invalid interval_secs: {}", value),
                },
                "watch_every_secs" => match value.parse::<f64>() {
                    Ok(v) if v.is_finite() => {
                        cfg.watch_every_secs = v.clamp(MIN_WATCH_SECS, MAX_WATCH_SECS)
                    }
                    _ => warn!("invalid watch_every_secs: {}", value),
                },
                "mount_point" if !value.is_empty() => cfg.mount_point = PathBuf::from(value),
                "show_battery" => cfg.show_battery = value == "1",
                _ => {} // Ignore unknown keys
            }
        }

        cfg
    }

    /// Apply an interval given on the command line. Non-positive values are
    /// rejected; positive ones are clamped to the range the config file allows.
    pub fn override_interval(&mut self, secs: f64) -> Result<(), SampleError> {
        interval_from_secs(secs)?;
        let clamped = clamp_interval(secs);
        if clamped != secs {
            warn!("interval {}s out of range, using {}s", secs, clamped);
        }
        self.interval_secs = clamped;
        Ok(())
    }

    /// Render the file contents written by [`save`](Self::save)
    pub fn render(&self) -> String {
        let b = |v: bool| if v { "1" } else { "0" };
        let lines = [
            "# sysglance configuration file".to_string(),
            String::new(),
            format!("interval_secs={}", self.interval_secs),
            format!("mount_point={}", self.mount_point.display()),
            format!("show_battery={}", b(self.show_battery)),
            format!("watch_every_secs={}", self.watch_every_secs),
        ];
        lines.join("\n") + "\n"
    }

    /// Save config to `path` (or the default location), returning the path
    /// written
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(&path)?;
        file.write_all(self.render().as_bytes())?;

        Ok(path)
    }
}

/// Below the minimum, CPU usage would be sampled faster than sysinfo can
/// update it
fn clamp_interval(secs: f64) -> f64 {
    secs.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_keys() {
        let cfg = GlanceConfig::parse(
            "# comment\n\
             interval_secs = 2.5\n\
             mount_point=/home\n\
             show_battery=0\n\
             watch_every_secs=5\n\
             color=blue\n",
        );
        assert_eq!(cfg.interval_secs, 2.5);
        assert_eq!(cfg.mount_point, PathBuf::from("/home"));
        assert!(!cfg.show_battery);
        assert_eq!(cfg.watch_every_secs, 5.0);
    }

    #[test]
    fn parse_clamps_and_ignores_bad_values() {
        let cfg = GlanceConfig::parse("interval_secs=0\nwatch_every_secs=abc\nnoequals\n");
        assert_eq!(cfg.interval_secs, MIN_INTERVAL_SECS);
        assert_eq!(cfg.watch_every_secs, GlanceConfig::default().watch_every_secs);

        let cfg = GlanceConfig::parse("interval_secs=99\ninterval_secs=NaN\n");
        assert_eq!(cfg.interval_secs, MAX_INTERVAL_SECS);
    }

    #[test]
    fn command_line_interval_is_clamped() {
        let mut cfg = GlanceConfig::default();
        cfg.override_interval(0.01).unwrap();
        assert_eq!(cfg.interval_secs, MIN_INTERVAL_SECS);

        cfg.override_interval(60.0).unwrap();
        assert_eq!(cfg.interval_secs, MAX_INTERVAL_SECS);

        cfg.override_interval(2.0).unwrap();
        assert_eq!(cfg.interval_secs, 2.0);
    }

    #[test]
    fn command_line_interval_rejects_non_positive() {
        let mut cfg = GlanceConfig::default();
        assert!(matches!(cfg.override_interval(0.0), Err(SampleError::InvalidArgument(_))));
        assert!(matches!(cfg.override_interval(-1.0), Err(SampleError::InvalidArgument(_))));
        assert_eq!(cfg.interval_secs, GlanceConfig::default().interval_secs);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sysglancerc");
        let cfg = GlanceConfig {
            interval_secs: 3.0,
            mount_point: PathBuf::from("/data"),
            show_battery: false,
            watch_every_secs: 10.0,
        };

        let written = cfg.save(Some(&path)).unwrap();
        assert_eq!(written, path);
        assert_eq!(GlanceConfig::load(Some(&path)), cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GlanceConfig::load(Some(&dir.path().join("absent")));
        assert_eq!(cfg, GlanceConfig::default());
    }
}
