//! Robot configuration for the NAO humanoid.
//!
//! Link dimensions follow N. Kofinas, "Forward and inverse kinematics for the
//! NAO humanoid robot" (Technical University of Crete, 2012). All lengths are
//! in millimeters.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::limits::JointLimits;
use crate::types::{JointAngleSet, LegSide};

/// Default standing pose in solve order (θ6, θ4, θ5, θ2, θ3, θ1).
/// Seeds the continuity state of both legs.
pub const STANDING_JOINTS: JointAngleSet =
    JointAngleSet::new([0.0, 1.047, -0.524, 0.0, -0.524, 0.0]);

/// Link lengths and offsets of the robot body.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RobotDimensions {
    // Arms and head: not used by the leg chain
    pub shoulder_offset_y: f64,
    pub elbow_offset_y: f64,
    pub upper_arm_length: f64,
    pub shoulder_offset_z: f64,
    pub lower_arm_length: f64,
    pub hand_offset_x: f64,
    pub hand_offset_z: f64,
    pub neck_offset_z: f64,
    pub camera_bottom_x: f64,
    pub camera_bottom_z: f64,
    pub camera_top_x: f64,
    pub camera_top_z: f64,

    // Legs
    pub hip_offset_z: f64,
    pub hip_offset_y: f64,
    pub thigh_length: f64,
    pub tibia_length: f64,
    pub foot_height: f64,
}

impl RobotDimensions {
    pub const fn nao() -> Self {
        Self {
            shoulder_offset_y: 98.0,
            elbow_offset_y: 15.0,
            upper_arm_length: 105.0,
            shoulder_offset_z: 100.0,
            lower_arm_length: 57.75,
            hand_offset_x: 55.95,
            hand_offset_z: 12.31,
            neck_offset_z: 126.5,
            camera_bottom_x: 48.8,
            camera_bottom_z: 23.81,
            camera_top_x: 53.9,
            camera_top_z: 67.9,
            hip_offset_z: 85.0,
            hip_offset_y: 50.0,
            thigh_length: 100.0,
            tibia_length: 102.9,
            foot_height: 45.11,
        }
    }

    /// Distance from hip to ankle with the knee fully stretched.
    pub fn max_leg_reach(&self) -> f64 {
        self.thigh_length + self.tibia_length
    }

    fn entries(&self) -> [(&'static str, f64); 17] {
        [
            ("shoulder_offset_y", self.shoulder_offset_y),
            ("elbow_offset_y", self.elbow_offset_y),
            ("upper_arm_length", self.upper_arm_length),
            ("shoulder_offset_z", self.shoulder_offset_z),
            ("lower_arm_length", self.lower_arm_length),
            ("hand_offset_x", self.hand_offset_x),
            ("hand_offset_z", self.hand_offset_z),
            ("neck_offset_z", self.neck_offset_z),
            ("camera_bottom_x", self.camera_bottom_x),
            ("camera_bottom_z", self.camera_bottom_z),
            ("camera_top_x", self.camera_top_x),
            ("camera_top_z", self.camera_top_z),
            ("hip_offset_z", self.hip_offset_z),
            ("hip_offset_y", self.hip_offset_y),
            ("thigh_length", self.thigh_length),
            ("tibia_length", self.tibia_length),
            ("foot_height", self.foot_height),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.entries() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDimension { name, value });
            }
        }
        Ok(())
    }
}

impl Default for RobotDimensions {
    fn default() -> Self {
        Self::nao()
    }
}

/// Everything the solver needs at construction time. Immutable afterwards.
///
/// ```rust,ignore
/// // Defaults are the NAO tables
/// let config = KinematicsConfig::default();
///
/// // Or load overrides from JSON; missing fields fall back to the defaults
/// let config = KinematicsConfig::load("nao_legs.json")?;
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KinematicsConfig {
    pub dimensions: RobotDimensions,
    pub left_limits: JointLimits,
    pub right_limits: JointLimits,
    /// Initial continuity state of both legs, in solve order.
    pub standing: JointAngleSet,
}

impl KinematicsConfig {
    pub fn limits(&self, side: LegSide) -> &JointLimits {
        match side {
            LegSide::Left => &self.left_limits,
            LegSide::Right => &self.right_limits,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dimensions.validate()?;
        self.left_limits.validate(LegSide::Left)?;
        self.right_limits.validate(LegSide::Right)?;
        if let Some(index) = self.standing.0.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteStandingPose { index });
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!("Loaded kinematics configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            dimensions: RobotDimensions::nao(),
            left_limits: JointLimits::nao_left(),
            right_limits: JointLimits::nao_right(),
            standing: STANDING_JOINTS,
        }
    }
}
