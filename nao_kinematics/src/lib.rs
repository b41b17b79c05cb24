// Analytic leg kinematics for the NAO humanoid robot

pub mod chain;
pub mod error;
pub mod geometry;
pub mod kinematics;
pub mod limits;
pub mod robot_config;
pub mod state;
pub mod tree;
pub mod types;

pub use chain::{forward_leg, LegChain};
pub use error::{ConfigError, KinematicsError};
pub use kinematics::{
    solve_candidates, Candidates, KinematicsSolver, LegSolution, LegSolver, DOMAIN_TOLERANCE,
    ORIENTATION_TOLERANCE, POSITION_TOLERANCE,
};
pub use limits::{JointLimit, JointLimits};
pub use robot_config::{KinematicsConfig, RobotDimensions, STANDING_JOINTS};
pub use state::{LegKinematicsState, SolveStats, SolveStatus};
pub use tree::{CandidateSet, SolutionTree, MAX_COMBINATIONS};
pub use types::{JointAngleSet, LegJoints, LegSide, Orientation, Pose};
