// Value types shared by the chain model and the solver.

use std::f64::consts::FRAC_PI_4;
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Which leg a chain, limit table or solve refers to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Left,
    Right,
}

impl LegSide {
    pub const BOTH: [LegSide; 2] = [LegSide::Left, LegSide::Right];

    pub fn is_left(self) -> bool {
        matches!(self, LegSide::Left)
    }

    pub fn opposite(self) -> Self {
        match self {
            LegSide::Left => LegSide::Right,
            LegSide::Right => LegSide::Left,
        }
    }

    /// +1 for the left leg, -1 for the right leg. Applied to lateral (Y) offsets.
    pub fn lateral_sign(self) -> f64 {
        match self {
            LegSide::Left => 1.0,
            LegSide::Right => -1.0,
        }
    }

    /// The ±π/4 correction of the hip-yaw-pitch axis baked into the hip transforms.
    pub fn hip_bias(self) -> f64 {
        match self {
            LegSide::Left => FRAC_PI_4,
            LegSide::Right => -FRAC_PI_4,
        }
    }

    /// Motor names of this leg in named joint order (θ1..θ6).
    pub fn motor_names(self) -> [&'static str; 6] {
        match self {
            LegSide::Left => [
                "LHipYawPitch",
                "LHipRoll",
                "LHipPitch",
                "LKneePitch",
                "LAnklePitch",
                "LAnkleRoll",
            ],
            LegSide::Right => [
                "RHipYawPitch",
                "RHipRoll",
                "RHipPitch",
                "RKneePitch",
                "RAnklePitch",
                "RAnkleRoll",
            ],
        }
    }
}

impl fmt::Display for LegSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegSide::Left => write!(f, "left"),
            LegSide::Right => write!(f, "right"),
        }
    }
}

/// Euler angles in radians, applied as yaw about Z, then pitch about Y, then roll about X.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Orientation {
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// Foot pose relative to the torso frame.
///
/// Position in millimeters, orientation in radians. The torso frame has X
/// pointing forward, Y to the robot's left and Z up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        }
    }

    pub fn from_parts(position: Vector3<f64>, orientation: Orientation) -> Self {
        Self::new(
            position.x,
            position.y,
            position.z,
            orientation.roll,
            orientation.pitch,
            orientation.yaw,
        )
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::new(self.roll, self.pitch, self.yaw)
    }

    /// Reflect the pose through the sagittal (XZ) plane, turning a left foot
    /// target into the equivalent right foot target and vice versa.
    pub fn mirrored(&self) -> Self {
        Self::new(self.x, -self.y, self.z, -self.roll, self.pitch, -self.yaw)
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z, self.roll, self.pitch, self.yaw]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Joint angles in the order the analytic solver derives them:
/// θ6 (ankle roll), θ4 (knee pitch), θ5 (ankle pitch), θ2 (hip roll),
/// θ3 (hip pitch), θ1 (hip yaw-pitch).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct JointAngleSet(pub [f64; 6]);

impl JointAngleSet {
    pub const fn new(angles: [f64; 6]) -> Self {
        Self(angles)
    }

    pub fn ankle_roll(&self) -> f64 {
        self.0[0]
    }

    pub fn knee_pitch(&self) -> f64 {
        self.0[1]
    }

    pub fn ankle_pitch(&self) -> f64 {
        self.0[2]
    }

    pub fn hip_roll(&self) -> f64 {
        self.0[3]
    }

    pub fn hip_pitch(&self) -> f64 {
        self.0[4]
    }

    pub fn hip_yaw_pitch(&self) -> f64 {
        self.0[5]
    }

    pub fn as_array(&self) -> &[f64; 6] {
        &self.0
    }

    /// Euclidean distance in 6D angle space.
    pub fn distance(&self, other: &JointAngleSet) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn to_joints(&self) -> LegJoints {
        let [theta6, theta4, theta5, theta2, theta3, theta1] = self.0;
        LegJoints {
            hip_yaw_pitch: theta1,
            hip_roll: theta2,
            hip_pitch: theta3,
            knee_pitch: theta4,
            ankle_pitch: theta5,
            ankle_roll: theta6,
        }
    }
}

impl From<LegJoints> for JointAngleSet {
    fn from(joints: LegJoints) -> Self {
        joints.to_solve_order()
    }
}

/// Joint angles of one leg in radians, in named order θ1..θ6.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct LegJoints {
    pub hip_yaw_pitch: f64,
    pub hip_roll: f64,
    pub hip_pitch: f64,
    pub knee_pitch: f64,
    pub ankle_pitch: f64,
    pub ankle_roll: f64,
}

impl LegJoints {
    pub const fn from_array(angles: [f64; 6]) -> Self {
        let [hip_yaw_pitch, hip_roll, hip_pitch, knee_pitch, ankle_pitch, ankle_roll] = angles;
        Self {
            hip_yaw_pitch,
            hip_roll,
            hip_pitch,
            knee_pitch,
            ankle_pitch,
            ankle_roll,
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.hip_yaw_pitch,
            self.hip_roll,
            self.hip_pitch,
            self.knee_pitch,
            self.ankle_pitch,
            self.ankle_roll,
        ]
    }

    pub fn to_solve_order(&self) -> JointAngleSet {
        JointAngleSet([
            self.ankle_roll,
            self.knee_pitch,
            self.ankle_pitch,
            self.hip_roll,
            self.hip_pitch,
            self.hip_yaw_pitch,
        ])
    }

    /// Pair each angle with the motor it drives on the given leg.
    pub fn named(&self, side: LegSide) -> [(&'static str, f64); 6] {
        let names = side.motor_names();
        let angles = self.to_array();
        std::array::from_fn(|i| (names[i], angles[i]))
    }
}

impl From<JointAngleSet> for LegJoints {
    fn from(angles: JointAngleSet) -> Self {
        angles.to_joints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_order_roundtrip() {
        let joints = LegJoints::from_array([0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let solve_order = joints.to_solve_order();
        assert_eq!(solve_order.0, [0.6, 0.4, 0.5, 0.2, 0.3, 0.1]);
        assert_eq!(solve_order.hip_yaw_pitch(), 0.1);
        assert_eq!(solve_order.ankle_roll(), 0.6);
        assert_eq!(LegJoints::from(solve_order), joints);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = JointAngleSet::new([0.0; 6]);
        let b = JointAngleSet::new([3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn mirrored_pose_flips_lateral_components() {
        let pose = Pose::new(10.0, 50.0, -300.0, 0.1, 0.2, 0.3);
        let mirrored = pose.mirrored();
        assert_eq!(mirrored, Pose::new(10.0, -50.0, -300.0, -0.1, 0.2, -0.3));
        assert_eq!(mirrored.mirrored(), pose);
    }

    #[test]
    fn named_joints_use_side_prefix() {
        let joints = LegJoints::from_array([0.0, 0.1, -0.5, 1.0, -0.5, -0.1]);
        let named = joints.named(LegSide::Right);
        assert_eq!(named[0], ("RHipYawPitch", 0.0));
        assert_eq!(named[3], ("RKneePitch", 1.0));
        assert_eq!(joints.named(LegSide::Left)[5], ("LAnkleRoll", -0.1));
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LegSide::Left).unwrap(), "\"left\"");
        assert_eq!(LegSide::Right.to_string(), "right");
        assert_eq!(LegSide::Left.opposite(), LegSide::Right);
    }
}
