use serde::Serialize;

/// Aggregate CPU information
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuInfo {
    /// Usage across all cores since the previous refresh, 0-100
    pub usage_percent: f32,
    pub logical_cores: usize,
    pub brand: String,
}

impl CpuInfo {
    /// Average of per-core usage figures
    pub fn from_cores(brand: String, per_core: &[f32]) -> Self {
        let usage_percent = if per_core.is_empty() {
            0.0
        } else {
            per_core.iter().sum::<f32>() / per_core.len() as f32
        };
        Self {
            usage_percent,
            logical_cores: per_core.len(),
            brand,
        }
    }
}
