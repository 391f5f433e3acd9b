use bevy::prelude::*;
use serde::Deserialize;

pub(crate) const CONFIG_PATH: &str = "assets/chamber.json";

/// Chamber dimensions and tuning, optionally overridden by a JSON file in
/// the assets directory.
#[derive(Debug, Clone, Resource, Deserialize)]
#[serde(default)]
pub struct ChamberConfig {
    /// Half-extent of the chamber on X and Z.
    pub width: f32,
    /// Wall height.
    pub height: f32,
    /// Half-span of the open gap splitting the chamber in two.
    pub gap_distance: f32,
    pub cube_half_width: f32,
    pub player_speed: f32,
}

impl Default for ChamberConfig {
    fn default() -> Self {
        ChamberConfig {
            width: 50.,
            height: 5.,
            gap_distance: 10.,
            cube_half_width: 2.5,
            player_speed: 25.,
        }
    }
}

impl ChamberConfig {
    /// Loads the config file, falling back to defaults when it is missing
    /// or malformed.
    pub fn load_or_default(path: &str) -> ChamberConfig {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(error) => {
                    warn!("failed to parse {path}: {error}; using the default chamber");
                    ChamberConfig::default()
                }
            },
            Err(error) => {
                warn!("failed to read {path}: {error}; using the default chamber");
                ChamberConfig::default()
            }
        }
    }
}
