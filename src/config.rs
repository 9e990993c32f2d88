//! Configuration loading for rekha-nav

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct RekhaConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub sensing: SensingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Motion and PID tuning
#[derive(Clone, Debug, Deserialize)]
pub struct ControlConfig {
    /// Base wheel power while following a line (default: 0.1)
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,

    /// Wheel power while centering on the target cell (default: 0.05)
    #[serde(default = "default_center_speed")]
    pub center_speed: f32,

    /// Wheel power magnitude for in-place rotation (default: 0.05)
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,

    /// Ultimate gain Ku for the Ziegler-Nichols derived PID (default: 5.0)
    #[serde(default = "default_ultimate_gain")]
    pub ultimate_gain: f32,

    /// Control sample interval in seconds; must match the tick pacing
    /// of the sensing collaborator (default: 0.05)
    #[serde(default = "default_sample_interval")]
    pub sample_interval: f32,

    /// Saturation bound for the PID correction term (default: 0.04)
    #[serde(default = "default_max_correction")]
    pub max_correction: f32,

    /// Angular tolerance in degrees for nudging forward while
    /// realigning (default: 5.0)
    #[serde(default = "default_align_tolerance_deg")]
    pub align_tolerance_deg: f32,

    /// Consecutive realignment ticks before the target edge is pruned
    /// and the planner re-invoked (default: 50)
    #[serde(default = "default_stuck_limit")]
    pub stuck_limit: u32,
}

/// Sensor geometry
#[derive(Clone, Debug, Deserialize)]
pub struct SensingConfig {
    /// Lookahead radius from robot center to the line-sensor row
    /// (default: 0.438)
    #[serde(default = "default_lookahead")]
    pub lookahead: f32,

    /// Physical spacing between adjacent line-sensor elements
    /// (default: 0.08)
    #[serde(default = "default_sensor_spacing")]
    pub sensor_spacing: f32,
}

/// Output configuration
#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Base name for the tour path file; ".path" is appended
    #[serde(default = "default_outfile")]
    pub outfile: String,
}

// Default value functions
fn default_base_speed() -> f32 {
    0.1
}
fn default_center_speed() -> f32 {
    0.05
}
fn default_rotate_speed() -> f32 {
    0.05
}
fn default_ultimate_gain() -> f32 {
    5.0
}
fn default_sample_interval() -> f32 {
    0.05
}
fn default_max_correction() -> f32 {
    0.04
}
fn default_align_tolerance_deg() -> f32 {
    5.0
}
fn default_stuck_limit() -> u32 {
    50
}
fn default_lookahead() -> f32 {
    0.438
}
fn default_sensor_spacing() -> f32 {
    0.08
}
fn default_outfile() -> String {
    "solution".to_string()
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            base_speed: default_base_speed(),
            center_speed: default_center_speed(),
            rotate_speed: default_rotate_speed(),
            ultimate_gain: default_ultimate_gain(),
            sample_interval: default_sample_interval(),
            max_correction: default_max_correction(),
            align_tolerance_deg: default_align_tolerance_deg(),
            stuck_limit: default_stuck_limit(),
        }
    }
}

impl Default for SensingConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            sensor_spacing: default_sensor_spacing(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            outfile: default_outfile(),
        }
    }
}

impl Default for RekhaConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            sensing: SensingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RekhaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::RekhaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: RekhaConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Full path of the tour output file
    pub fn tour_path(&self) -> String {
        format!("{}.path", self.output.outfile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RekhaConfig::default();
        assert_eq!(config.control.stuck_limit, 50);
        assert!((config.sensing.lookahead - 0.438).abs() < 1e-6);
        assert_eq!(config.tour_path(), "solution.path");
    }

    #[test]
    fn test_partial_toml() {
        let config: RekhaConfig = toml::from_str(
            r#"
            [control]
            base_speed = 0.15

            [sensing]
            sensor_spacing = 0.16

            [output]
            outfile = "run7"
            "#,
        )
        .unwrap();
        assert!((config.control.base_speed - 0.15).abs() < 1e-6);
        assert!((config.sensing.sensor_spacing - 0.16).abs() < 1e-6);
        // Unspecified fields fall back to defaults
        assert_eq!(config.control.stuck_limit, 50);
        assert!((config.sensing.lookahead - 0.438).abs() < 1e-6);
        assert_eq!(config.tour_path(), "run7.path");
    }
}
