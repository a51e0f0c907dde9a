//! Data-driven game balance
//!
//! Every behavioral knob the sim reads lives here so balance passes don't
//! touch sim code. Loadable from JSON; unknown fields are rejected, missing
//! fields fall back to defaults.

use serde::{Deserialize, Serialize};

/// Balance knobs consumed by the sim core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Seconds between shots
    pub shoot_delay: f32,
    /// Seconds between path-finder calls while seeking
    pub repath_interval: f32,
    /// Enemy hit points on spawn
    pub enemy_health: i32,
    /// Player hit points on spawn
    pub player_health: i32,
    /// Hit points the player recovers per enemy kill
    pub heal_on_kill: i32,
    /// Upper bound on player hit points
    pub max_health: i32,
    /// Enemy movement speed (world units per second)
    pub enemy_speed: f32,
    /// Chase breaks into stand-and-fire below this many box widths
    pub stall_range_boxes: f32,
    /// Stand-and-fire breaks back to seeking above this many tiles
    pub break_range_tiles: f32,
    /// Per-axis distance at which a waypoint counts as reached
    pub waypoint_tolerance: f32,
    /// Half-width of the random aim jitter per shot, radians
    pub shot_spread: f32,
    /// Damage a bullet deals on impact
    pub bullet_damage: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            shoot_delay: 1.0,
            repath_interval: 1.0,
            enemy_health: 3,
            player_health: 3,
            heal_on_kill: 1,
            max_health: 5,
            enemy_speed: 32.0,
            stall_range_boxes: 4.0,
            break_range_tiles: 5.0,
            waypoint_tolerance: 3.0,
            shot_spread: 200.0 / 1500.0,
            bullet_damage: 1,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON (for dumping the active balance).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
