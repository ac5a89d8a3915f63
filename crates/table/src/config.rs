//! # Table Configuration
//!
//! Every tunable of the table lives in [`TableConfig`], loaded from JSON.
//! All sections and fields are optional in the file; anything left out keeps
//! the value the table was designed around, so a config only needs to name
//! what it changes:
//!
//! ```json
//! { "plunger": { "max_impulse": 60.0 }, "flippers": { "activated_angle": 0.8 } }
//! ```

use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub physics: PhysicsConfig,
    pub table: TableDimensions,
    pub flippers: FlipperConfig,
    pub plunger: PlungerConfig,
    pub ball: BallConfig,
    pub assets: AssetConfig,
    pub rocks: RockTable,
    pub camera: CameraConfig,
    pub background: Option<BackgroundConfig>,
}

impl TableConfig {
    /// Parse a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 3],
    /// Internal subdivision increment of the world
    pub fixed_timestep: f32,
    pub max_substeps: u32,
    /// Time handed to the world on every frame, independent of wall time
    pub frame_step: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.8, 0.0],
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 10,
            frame_step: 1.0 / 60.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDimensions {
    pub width: f32,
    pub length: f32,
    pub thickness: f32,
    /// Rotation of the playfield about X, in radians
    pub tilt: f32,
    pub wall_thickness: f32,
    pub wall_height: f32,
}

impl Default for TableDimensions {
    fn default() -> Self {
        Self {
            width: 20.0,
            length: 34.0,
            thickness: 0.5,
            tilt: -PI / 30.0,
            wall_thickness: 0.9,
            wall_height: 2.0,
        }
    }
}

/// Where one flipper's pivot sits and how its model hangs off it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipperPlacement {
    pub position: [f32; 3],
    pub yaw: f32,
    pub model_yaw: f32,
    pub model_offset: [f32; 3],
}

impl Default for FlipperPlacement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            yaw: 0.0,
            model_yaw: 0.0,
            model_offset: [0.0; 3],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipperConfig {
    /// Swing angle in radians; left flippers turn positive, right negative
    pub activated_angle: f32,
    pub swing_duration: f32,
    pub length: f32,
    pub height: f32,
    pub width: f32,
    pub model_scale: f32,
    pub left: FlipperPlacement,
    pub right: FlipperPlacement,
}

impl Default for FlipperConfig {
    fn default() -> Self {
        Self {
            activated_angle: 0.6,
            swing_duration: 0.1,
            length: 3.0,
            height: 1.0,
            width: 0.4,
            model_scale: 0.55,
            left: FlipperPlacement {
                position: [4.9, -0.75, -13.5],
                yaw: -0.3,
                model_yaw: 3.2,
                model_offset: [-1.6, 0.0, -0.4],
            },
            right: FlipperPlacement {
                position: [-2.7, -0.75, -13.6],
                yaw: 0.3,
                model_yaw: 0.0,
                model_offset: [1.6, 0.0, -0.4],
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlungerConfig {
    pub position: [f32; 3],
    pub radius: f32,
    pub length: f32,
    /// Pull-back along the launch axis while charging
    pub charge_offset: f32,
    pub charge_duration: f32,
    /// Forward travel on release, measured from rest
    pub release_offset: f32,
    pub release_duration: f32,
    pub min_impulse: f32,
    pub max_impulse: f32,
    /// Charge time at which the impulse saturates
    pub max_charge: f32,
}

impl Default for PlungerConfig {
    fn default() -> Self {
        Self {
            position: [-9.0, -0.5, -15.0],
            radius: 0.5,
            length: 2.0,
            charge_offset: -1.0,
            charge_duration: 2.0,
            release_offset: 1.0,
            release_duration: 0.2,
            min_impulse: 8.0,
            max_impulse: 45.0,
            max_charge: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    pub mass: f32,
    pub spawn: [f32; 3],
    pub model_scale: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            mass: 1.0,
            spawn: [-9.0, -0.5, -14.0],
            model_scale: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory model paths are resolved against
    pub root: PathBuf,
    pub ball: String,
    pub flipper: String,
    pub wall: String,
    pub tower: String,
    pub tower_scale: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ball: "models/ball.glb".into(),
            flipper: "models/pinball_flipper.glb".into(),
            wall: "models/longwall.glb".into(),
            tower: "models/Tower.glb".into(),
            tower_scale: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RockPlacement {
    pub model: String,
    pub position: [f32; 3],
    pub scale: f32,
    #[serde(default)]
    pub yaw: f32,
}

impl RockPlacement {
    fn new(model: &str, position: [f32; 3], yaw: f32) -> Self {
        Self {
            model: model.to_owned(),
            position,
            scale: 0.5,
            yaw,
        }
    }
}

/// Decorative rocks piled in the two upper corners
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RockTable(pub Vec<RockPlacement>);

impl Default for RockTable {
    fn default() -> Self {
        const ROCK1: &str = "models/roca1.glb";
        const ROCK2: &str = "models/roca2.glb";
        const ROCK3: &str = "models/roca3.glb";
        // One corner; the other is its mirror across X
        let corner = [
            (ROCK1, [8.5, 1.5, 13.9], 0.0),
            (ROCK2, [6.5, 1.5, 15.9], 0.0),
            (ROCK3, [7.5, 1.5, 15.0], 0.0),
            (ROCK3, [9.5, 1.5, 12.6], 0.6),
            (ROCK1, [7.5, 2.0, 15.5], 0.0),
            (ROCK2, [8.5, 2.0, 15.0], 0.0),
            (ROCK1, [9.5, 2.0, 13.6], 0.6),
            (ROCK3, [8.6, 2.4, 15.5], 0.0),
            (ROCK2, [9.5, 2.5, 14.6], 0.6),
        ];
        let left = corner
            .iter()
            .map(|&(model, [x, y, z], yaw)| RockPlacement::new(model, [-x, y, z], -yaw));
        let right = corner
            .iter()
            .map(|&(model, position, yaw)| RockPlacement::new(model, position, yaw));
        Self(left.chain(right).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub background: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 20.0, -22.0],
            target: [0.0; 3],
            fov: 60.0,
            near: 0.2,
            far: 2000.0,
            background: 0x00bf_d1e5,
        }
    }
}

/// Optional scenery model placed around the table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub model: String,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: [f32; 3],
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            model: "models/room.glb".into(),
            position: [0.0, 0.0, -30.0],
            scale: [50.0, 50.0, 50.0],
            rotation: [-PI / 30.0, 0.0, 0.0],
        }
    }
}

/// Convert a config triple into a vector
#[must_use]
pub fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(TableConfig::from_json("{}").unwrap(), TableConfig::default());
    }

    #[test]
    fn rock_table_mirrors_both_corners() {
        let rocks = RockTable::default().0;
        assert_eq!(rocks.len(), 18);
        assert_eq!(rocks[0].position, [-8.5, 1.5, 13.9]);
        assert_eq!(rocks[3].yaw, -0.6);
        assert_eq!(rocks[12].position, [9.5, 1.5, 12.6]);
        assert_eq!(rocks[12].yaw, 0.6);
    }

    #[test]
    fn background_is_absent_by_default() {
        assert!(TableConfig::default().background.is_none());
    }
}
