//! Global production constants.

use serde::{Deserialize, Serialize};

/// Global constants shared by every production queue.
///
/// Percentages are integers so the build-time formula stays exact across
/// platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralData {
    /// Build speed multiplier, in percent (80 = 0.8).
    #[serde(default = "default_build_speed_percent")]
    pub build_speed_percent: i32,

    /// Extra build-mode scaling applied after the base formula, in percent.
    #[serde(default = "default_build_time_scale_percent")]
    pub build_time_scale_percent: i32,

    /// Simulation ticks per game minute.
    #[serde(default = "default_ticks_per_minute")]
    pub ticks_per_minute: i32,

    /// Under low power an item progresses once every this many ticks.
    #[serde(default = "default_low_power_slowdown")]
    pub low_power_slowdown: i32,
}

const fn default_build_speed_percent() -> i32 {
    80
}

const fn default_build_time_scale_percent() -> i32 {
    100
}

/// 25 ticks per second.
const fn default_ticks_per_minute() -> i32 {
    25 * 60
}

const fn default_low_power_slowdown() -> i32 {
    3
}

impl Default for GeneralData {
    fn default() -> Self {
        Self {
            build_speed_percent: default_build_speed_percent(),
            build_time_scale_percent: default_build_time_scale_percent(),
            ticks_per_minute: default_ticks_per_minute(),
            low_power_slowdown: default_low_power_slowdown(),
        }
    }
}
