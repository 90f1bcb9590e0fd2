//! Two-sample network throughput estimation.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

use super::SystemInfo;
use crate::error::SampleError;

/// Cumulative byte counters since boot, summed over interfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteCounters {
    pub sent: u64,
    pub received: u64,
}

/// Counter snapshot taken at a known instant
#[derive(Debug, Clone, Copy)]
pub struct ThroughputSample {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub timestamp: Instant,
}

impl ThroughputSample {
    fn read<P: SystemInfo + ?Sized>(provider: &mut P) -> Self {
        let counters = provider.byte_counters();
        Self {
            bytes_sent: counters.sent,
            bytes_received: counters.received,
            timestamp: provider.now(),
        }
    }
}

/// Upload/download rates derived from two samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThroughputRate {
    pub upload_bytes_per_sec: f64,
    pub download_bytes_per_sec: f64,
    /// Absolute counters from the later sample
    pub total_sent: u64,
    pub total_received: u64,
}

impl ThroughputRate {
    /// Rates over `interval` from `earlier` to `later`. A counter that went
    /// backwards (interface reset, wraparound) contributes a zero delta.
    pub fn between(earlier: &ThroughputSample, later: &ThroughputSample, interval: Duration) -> Self {
        let secs = interval.as_secs_f64();
        let sent = later.bytes_sent.saturating_sub(earlier.bytes_sent);
        let received = later.bytes_received.saturating_sub(earlier.bytes_received);

        if later.bytes_sent < earlier.bytes_sent || later.bytes_received < earlier.bytes_received {
            debug!("byte counter regression, clamping delta to zero");
        }

        let (upload, download) = if secs > 0.0 {
            (sent as f64 / secs, received as f64 / secs)
        } else {
            (0.0, 0.0)
        };

        Self {
            upload_bytes_per_sec: upload,
            download_bytes_per_sec: download,
            total_sent: later.bytes_sent,
            total_received: later.bytes_received,
        }
    }
}

/// Convert a seconds value from configuration or the command line into a
/// sampling interval. Zero, negative and non-finite values are rejected.
pub fn interval_from_secs(secs: f64) -> Result<Duration, SampleError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(SampleError::InvalidArgument(format!(
            "sampling interval must be positive, got {}",
            secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| SampleError::InvalidArgument(format!("sampling interval {}: {}", secs, e)))
}

/// Read the counters, block for `interval`, read again and derive the rates.
///
/// The wait is a plain blocking sleep on the calling thread; accuracy depends
/// on wall-clock time actually elapsing between the two reads.
pub fn sample_throughput<P: SystemInfo + ?Sized>(
    provider: &mut P,
    interval: Duration,
) -> Result<ThroughputRate, SampleError> {
    if interval.is_zero() {
        return Err(SampleError::InvalidArgument(
            "sampling interval must be positive, got 0s".into(),
        ));
    }

    let first = ThroughputSample::read(provider);
    provider.sleep(interval);
    let second = ThroughputSample::read(provider);

    let rate = ThroughputRate::between(&first, &second, interval);
    trace!(
        up = rate.upload_bytes_per_sec,
        down = rate.download_bytes_per_sec,
        elapsed_ms = second.timestamp.duration_since(first.timestamp).as_millis() as u64,
        "sampled throughput"
    );
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sent: u64, received: u64, at: Instant) -> ThroughputSample {
        ThroughputSample {
            bytes_sent: sent,
            bytes_received: received,
            timestamp: at,
        }
    }

    #[test]
    fn rate_from_deltas() {
        let t0 = Instant::now();
        let a = sample(1000, 2000, t0);
        let b = sample(1500, 2600, t0 + Duration::from_secs(1));
        let rate = ThroughputRate::between(&a, &b, Duration::from_secs(1));
        assert_eq!(rate.upload_bytes_per_sec, 500.0);
        assert_eq!(rate.download_bytes_per_sec, 600.0);
        assert_eq!(rate.total_sent, 1500);
        assert_eq!(rate.total_received, 2600);
    }

    #[test]
    fn rate_scales_with_interval() {
        let t0 = Instant::now();
        let a = sample(0, 0, t0);
        let b = sample(1000, 4000, t0 + Duration::from_millis(500));
        let rate = ThroughputRate::between(&a, &b, Duration::from_millis(500));
        assert_eq!(rate.upload_bytes_per_sec, 2000.0);
        assert_eq!(rate.download_bytes_per_sec, 8000.0);
    }

    #[test]
    fn regression_clamps_to_zero() {
        let t0 = Instant::now();
        let a = sample(5000, 2000, t0);
        let b = sample(100, 2600, t0 + Duration::from_secs(1));
        let rate = ThroughputRate::between(&a, &b, Duration::from_secs(1));
        assert_eq!(rate.upload_bytes_per_sec, 0.0);
        assert_eq!(rate.download_bytes_per_sec, 600.0);
        assert_eq!(rate.total_sent, 100);
    }

    #[test]
    fn interval_from_secs_rejects_non_positive() {
        assert!(matches!(interval_from_secs(0.0), Err(SampleError::InvalidArgument(_))));
        assert!(matches!(interval_from_secs(-1.0), Err(SampleError::InvalidArgument(_))));
        assert!(matches!(interval_from_secs(f64::NAN), Err(SampleError::InvalidArgument(_))));
        assert!(matches!(interval_from_secs(f64::INFINITY), Err(SampleError::InvalidArgument(_))));
        assert_eq!(interval_from_secs(1.5).unwrap(), Duration::from_millis(1500));
    }
}
