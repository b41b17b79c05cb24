//! The 6-joint NAO leg chain and its forward kinematics.
//!
//! Standard DH parameters for the leg (Kofinas 2012). `bias` is +π/4 for the
//! left leg and -π/4 for the right leg:
//!
//! ```text
//! Link | a            | α                | d | θ
//! -----|--------------|------------------|---|-------------
//! 0→1  | 0            | -3π/4 (L) -π/4 (R) | 0 | θ1 - π/2
//! 1→2  | 0            | -π/2             | 0 | θ2 + bias
//! 2→3  | 0            | π/2              | 0 | θ3
//! 3→4  | -ThighLength | 0                | 0 | θ4
//! 4→5  | -TibiaLength | 0                | 0 | θ5
//! 5→6  | 0            | -π/2             | 0 | θ6
//! ```
//!
//! The full chain is
//! `A_base_0 · T_0_1 · T_1_2 · T_2_3 · T_3_4 · T_4_5 · T_5_6 · Rot_zy · A_6_end`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::geometry::{dh, orientation_to_transform, pose_from_transform, translation, Transform};
use crate::robot_config::RobotDimensions;
use crate::types::{LegJoints, LegSide, Pose};

/// Kinematic model of one leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegChain {
    side: LegSide,
    dimensions: RobotDimensions,
}

impl LegChain {
    pub fn new(side: LegSide, dimensions: RobotDimensions) -> Self {
        Self { side, dimensions }
    }

    pub fn nao(side: LegSide) -> Self {
        Self::new(side, RobotDimensions::nao())
    }

    pub fn side(&self) -> LegSide {
        self.side
    }

    pub fn dimensions(&self) -> &RobotDimensions {
        &self.dimensions
    }

    /// Torso to hip: the hip sits `HipOffsetY` to the side and `HipOffsetZ` below.
    pub fn base_to_hip(&self) -> Transform {
        translation(
            0.0,
            self.side.lateral_sign() * self.dimensions.hip_offset_y,
            -self.dimensions.hip_offset_z,
        )
    }

    /// T_0_1. The hip-yaw-pitch axis is tilted 45° towards the body's midline.
    pub fn hip_yaw_pitch(&self, theta1: f64) -> Transform {
        let alpha = match self.side {
            LegSide::Left => -3.0 * FRAC_PI_4,
            LegSide::Right => -FRAC_PI_4,
        };
        dh(0.0, alpha, 0.0, theta1 - FRAC_PI_2)
    }

    /// T_1_2
    pub fn hip_roll(&self, theta2: f64) -> Transform {
        dh(0.0, -FRAC_PI_2, 0.0, theta2 + self.side.hip_bias())
    }

    /// T_2_3
    pub fn hip_pitch(&self, theta3: f64) -> Transform {
        dh(0.0, FRAC_PI_2, 0.0, theta3)
    }

    /// T_3_4
    pub fn knee_pitch(&self, theta4: f64) -> Transform {
        dh(-self.dimensions.thigh_length, 0.0, 0.0, theta4)
    }

    /// T_4_5
    pub fn ankle_pitch(&self, theta5: f64) -> Transform {
        dh(-self.dimensions.tibia_length, 0.0, 0.0, theta5)
    }

    /// T_5_6
    pub fn ankle_roll(&self, theta6: f64) -> Transform {
        dh(0.0, -FRAC_PI_2, 0.0, theta6)
    }

    /// Rot_zy: realigns the last DH frame with the torso axes.
    pub fn axis_realignment(&self) -> Transform {
        orientation_to_transform(0.0, -FRAC_PI_2, PI)
    }

    /// A_6_end: ankle joint down to the sole.
    pub fn ankle_to_sole(&self) -> Transform {
        translation(0.0, 0.0, -self.dimensions.foot_height)
    }

    /// Torso-to-sole transform for the given joint angles.
    pub fn chain_transform(&self, joints: &LegJoints) -> Transform {
        self.base_to_hip()
            * self.hip_yaw_pitch(joints.hip_yaw_pitch)
            * self.hip_roll(joints.hip_roll)
            * self.hip_pitch(joints.hip_pitch)
            * self.knee_pitch(joints.knee_pitch)
            * self.ankle_pitch(joints.ankle_pitch)
            * self.ankle_roll(joints.ankle_roll)
            * self.axis_realignment()
            * self.ankle_to_sole()
    }

    /// Forward kinematics: foot pose for the given joint angles.
    pub fn forward(&self, joints: &LegJoints) -> Pose {
        pose_from_transform(&self.chain_transform(joints))
    }
}

/// Forward kinematics of a NAO leg with the default dimensions.
pub fn forward_leg(joints: &LegJoints, side: LegSide) -> Pose {
    LegChain::nao(side).forward(joints)
}
