//! # Terrain Settings
//!
//! Tunables for generation, streaming and the worker pool, loaded from a JSON file.
//! Missing fields take their default value, so a settings file only needs to list
//! what it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Seed for the height noise and the per-zone carver RNG.
    pub seed: u32,
    /// Zones generated around the player's zone, in each direction.
    pub load_radius_zones: i32,
    /// Worker threads in the task pool. `0` means one per available core.
    pub worker_count: usize,
    /// Tasks a single worker may hold before new work is queued on the coordinator.
    pub max_tasks_in_flight: usize,
    pub river_probability: f64,
    pub cave_probability: f64,
    pub sea_level: i32,
    pub base_height: f64,
    pub height_amplitude: f64,
    pub noise_scale: f64,
    pub snow_line: i32,
    pub tick_interval_ms: u64,
    /// Ticks the headless binary runs before exiting.
    pub headless_ticks: u32,
}

impl TerrainSettings {
    /// Loads settings from `path`, falling back to the defaults when the file is
    /// missing or malformed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to read settings from {} - {}", path.display(), e);
                return TerrainSettings::default();
            }
        };
        match TerrainSettings::from_json(&text) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to parse settings from {} - {}", path.display(), e);
                TerrainSettings::default()
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The worker count with `0` resolved against the machine's parallelism.
    pub fn resolved_worker_count(&self) -> usize {
        if self.worker_count > 0 {
            return self.worker_count;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            load_radius_zones: 2,
            worker_count: 0,
            max_tasks_in_flight: 2,
            river_probability: 0.15,
            cave_probability: 0.15,
            sea_level: 128,
            base_height: 136.0,
            height_amplitude: 40.0,
            noise_scale: 0.01,
            snow_line: 170,
            tick_interval_ms: 16,
            headless_ticks: if cfg!(debug_assertions) { 60 } else { 600 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = TerrainSettings::from_json(r#"{ "seed": 7, "load_radius_zones": 0 }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.load_radius_zones, 0);
        assert_eq!(settings.river_probability, 0.15);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let settings = TerrainSettings::load_from_file("does/not/exist.json");
        assert_eq!(settings, TerrainSettings::default());
    }

    #[test]
    fn settings_survive_serialization() {
        let settings = TerrainSettings {
            seed: 99,
            ..TerrainSettings::default()
        };
        let text = settings.to_json().unwrap();
        assert_eq!(TerrainSettings::from_json(&text).unwrap(), settings);
    }
}
