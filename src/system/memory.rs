use serde::Serialize;

/// Memory usage information
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total: u64, // bytes
    pub used: u64,  // bytes
}

impl MemoryInfo {
    /// Memory usage as percentage
    pub fn percent(&self) -> f64 {
        percent_of(self.used, self.total)
    }
}

pub(crate) fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
