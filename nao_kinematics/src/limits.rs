//! Joint limit tables for the NAO legs.
//!
//! Values are the mechanical limits published for the NAO (radians). They are
//! deliberately asymmetric between sides and must not be "tidied up": the
//! solver's pruning, and thus which configuration the robot ends up in,
//! depends on the exact numbers.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{JointAngleSet, LegSide};

/// Open interval `(low, high)` of admissible angles for one joint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct JointLimit {
    pub low: f64,
    pub high: f64,
}

impl JointLimit {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Strict membership test. NaN is never inside.
    pub fn contains(&self, angle: f64) -> bool {
        self.low < angle && angle < self.high
    }

    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low < self.high
    }
}

/// Limits for the six joints of one leg, in named order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub hip_yaw_pitch: JointLimit,
    pub hip_roll: JointLimit,
    pub hip_pitch: JointLimit,
    pub knee_pitch: JointLimit,
    pub ankle_pitch: JointLimit,
    pub ankle_roll: JointLimit,
}

impl JointLimits {
    pub const fn nao_left() -> Self {
        Self {
            hip_yaw_pitch: JointLimit::new(-1.1453, 0.7408),
            hip_roll: JointLimit::new(-0.3794, 0.7904),
            hip_pitch: JointLimit::new(-1.7739, 0.4840),
            knee_pitch: JointLimit::new(-0.0923, 2.1125),
            ankle_pitch: JointLimit::new(-1.1895, 0.9227),
            ankle_roll: JointLimit::new(-0.3978, 0.7690),
        }
    }

    pub const fn nao_right() -> Self {
        Self {
            hip_yaw_pitch: JointLimit::new(-1.1453, 0.7408),
            hip_roll: JointLimit::new(-0.7383, 0.4147),
            hip_pitch: JointLimit::new(-1.7723, 0.4856),
            knee_pitch: JointLimit::new(-0.1030, 2.1201),
            ankle_pitch: JointLimit::new(-1.1864, 0.9320),
            ankle_roll: JointLimit::new(-1.1864, 0.3886),
        }
    }

    pub const fn nao(side: LegSide) -> Self {
        match side {
            LegSide::Left => Self::nao_left(),
            LegSide::Right => Self::nao_right(),
        }
    }

    /// `(joint name, limit)` pairs in named order θ1..θ6.
    pub fn entries(&self) -> [(&'static str, JointLimit); 6] {
        [
            ("hip_yaw_pitch", self.hip_yaw_pitch),
            ("hip_roll", self.hip_roll),
            ("hip_pitch", self.hip_pitch),
            ("knee_pitch", self.knee_pitch),
            ("ankle_pitch", self.ankle_pitch),
            ("ankle_roll", self.ankle_roll),
        ]
    }

    /// True when every angle of the set lies strictly inside its limit.
    pub fn admits(&self, angles: &JointAngleSet) -> bool {
        self.ankle_roll.contains(angles.ankle_roll())
            && self.knee_pitch.contains(angles.knee_pitch())
            && self.ankle_pitch.contains(angles.ankle_pitch())
            && self.hip_roll.contains(angles.hip_roll())
            && self.hip_pitch.contains(angles.hip_pitch())
            && self.hip_yaw_pitch.contains(angles.hip_yaw_pitch())
    }

    pub fn validate(&self, side: LegSide) -> Result<(), ConfigError> {
        for (joint, limit) in self.entries() {
            if !limit.is_valid() {
                return Err(ConfigError::InvalidLimit {
                    side,
                    joint,
                    low: limit.low,
                    high: limit.high,
                });
            }
        }
        Ok(())
    }
}
