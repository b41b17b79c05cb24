// Analytic inverse kinematics for the NAO legs.
// Based on: N. Kofinas, E. Orfanoudakis, M. G. Lagoudakis,
// "Complete Analytical Forward and Inverse Kinematics for the NAO Humanoid Robot",
// Journal of Intelligent & Robotic Systems, 2015.
//
// The angles are derived one stage at a time in the order θ6, θ4, θ5, θ2, θ3, θ1.
// Every closed-form step yields up to two roots; roots outside the joint limits
// of the leg are dropped immediately, so the search tree stays small. The sign
// ambiguity of acos/asin also lets through combinations that do not reach the
// target at all, so every full combination is checked with forward kinematics.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, info, trace, warn};

use crate::chain::LegChain;
use crate::error::{ConfigError, KinematicsError};
use crate::geometry::{orientation_to_transform, rigid_inverse, transform_from_pose, translation_of, Transform};
use crate::limits::{JointLimit, JointLimits};
use crate::robot_config::KinematicsConfig;
use crate::state::{LegKinematicsState, SolveStatus};
use crate::tree::{CandidateSet, SolutionTree};
use crate::types::{JointAngleSet, LegJoints, LegSide, Pose};

/// How far outside `[-1, 1]` an `asin`/`acos` argument may drift and still be
/// treated as rounding noise.
pub const DOMAIN_TOLERANCE: f64 = 1e-6;

/// Largest foot position error (mm) of an accepted combination.
pub const POSITION_TOLERANCE: f64 = 1e-2;

/// Largest foot rotation error (rad) of an accepted combination.
pub const ORIENTATION_TOLERANCE: f64 = 1e-4;

/// Counts the trig arguments that had to be clamped during one solve.
#[derive(Debug, Default)]
struct DomainGuard {
    clamps: u32,
}

impl DomainGuard {
    /// Pass `value` on if it is a valid `asin`/`acos` argument.
    ///
    /// Values just outside the unit interval are clamped; anything further
    /// out (including NaN and infinities) prunes the branch.
    fn unit(&mut self, value: f64, stage: &'static str) -> Option<f64> {
        if (-1.0..=1.0).contains(&value) {
            return Some(value);
        }
        if value.abs() <= 1.0 + DOMAIN_TOLERANCE {
            self.clamps += 1;
            trace!("Clamped {} argument {:e} into [-1, 1]", stage, value);
            return Some(value.clamp(-1.0, 1.0));
        }
        trace!("{} argument {} outside trig domain, pruning branch", stage, value);
        None
    }
}

/// The two roots of `sin(x) = sin(primary)`, primary first.
fn sine_pair(primary: f64) -> [f64; 2] {
    let half_turn = if primary >= 0.0 { PI } else { -PI };
    [primary, half_turn - primary]
}

/// Candidates that survive the joint limit, in their original order.
fn admitted(candidates: [f64; 2], limit: &JointLimit) -> impl Iterator<Item = f64> + '_ {
    candidates.into_iter().filter(move |angle| limit.contains(*angle))
}

/// Whether the chain at `angles` puts the foot on `target`.
fn reaches(chain: &LegChain, angles: &JointAngleSet, target: &Transform) -> bool {
    let reached = chain.chain_transform(&angles.to_joints());
    let position_error = (translation_of(&reached) - translation_of(target)).norm();

    // Angle of the rotation between the reached and the desired foot frame
    let difference = reached.fixed_view::<3, 3>(0, 0).transpose() * target.fixed_view::<3, 3>(0, 0);
    let cos_error = ((difference.trace() - 1.0) / 2.0).clamp(-1.0, 1.0);

    position_error <= POSITION_TOLERANCE && cos_error.acos() <= ORIENTATION_TOLERANCE
}

/// Every joint configuration that reaches a target, before selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidates {
    pub set: CandidateSet,
    /// Trig arguments clamped back into `[-1, 1]` along the way.
    pub domain_clamps: u32,
    /// Combinations within the joint limits that missed the target.
    pub spurious: u32,
}

/// Enumerate all limit-respecting joint configurations that place the foot at
/// `target`. Pure: no state is read or written.
pub fn solve_candidates(chain: &LegChain, limits: &JointLimits, target: &Pose) -> Candidates {
    let dims = chain.dimensions();
    let thigh = dims.thigh_length;
    let tibia = dims.tibia_length;
    let bias = chain.side().hip_bias();

    let mut tree = SolutionTree::new();
    let mut domain = DomainGuard::default();

    // Strip the fixed hip offset and foot height off the target
    let t = transform_from_pose(target);
    let t_hat = rigid_inverse(&chain.base_to_hip()) * t * rigid_inverse(&chain.ankle_to_sole());
    let t_tilde = orientation_to_transform(bias, 0.0, 0.0) * t_hat;
    let t_prime = rigid_inverse(&t_tilde);

    // θ6: ankle roll
    let theta6 = (t_prime[(1, 3)] / t_prime[(2, 3)]).atan();
    let ankle_roll = if limits.ankle_roll.contains(theta6) {
        tree.add_ankle_roll(theta6)
    } else {
        None
    };

    // θ4: knee pitch, from the hip-to-ankle distance
    let distance = (t_prime[(0, 3)].powi(2) + t_prime[(1, 3)].powi(2) + t_prime[(2, 3)].powi(2)).sqrt();
    let knee_cos = domain.unit(
        (thigh.powi(2) + tibia.powi(2) - distance.powi(2)) / (2.0 * thigh * tibia),
        "knee pitch",
    );

    if let (Some(ankle_roll), Some(knee_cos)) = (ankle_roll, knee_cos) {
        let knee = PI - knee_cos.acos();
        let t_tilde_2 = t_tilde * rigid_inverse(&(chain.ankle_roll(theta6) * chain.axis_realignment()));
        let t_2prime = rigid_inverse(&t_tilde_2);

        for theta4 in admitted([knee, -knee], &limits.knee_pitch) {
            let Some(knee_pitch) = tree.add_knee_pitch(ankle_roll, theta4) else {
                continue;
            };

            // θ5: ankle pitch
            let (s4, c4) = theta4.sin_cos();
            let numerator = t_2prime[(1, 3)] * (tibia + thigh * c4) + thigh * t_2prime[(0, 3)] * s4;
            let denominator = thigh.powi(2) * s4.powi(2) + (tibia + thigh * c4).powi(2);
            let Some(ankle_sin) = domain.unit(-numerator / denominator, "ankle pitch") else {
                continue;
            };

            for theta5 in admitted(sine_pair(ankle_sin.asin()), &limits.ankle_pitch) {
                let Some(ankle_pitch) = tree.add_ankle_pitch(knee_pitch, theta5) else {
                    continue;
                };

                // θ2: hip roll
                let t_3prime =
                    t_tilde_2 * rigid_inverse(&(chain.knee_pitch(theta4) * chain.ankle_pitch(theta5)));
                let Some(hip_cos) = domain.unit(t_3prime[(1, 2)], "hip roll") else {
                    continue;
                };
                let hip = hip_cos.acos();

                for theta2 in admitted([hip - bias, -hip - bias], &limits.hip_roll) {
                    let biased_sin = (theta2 + bias).sin();

                    // θ3: hip pitch
                    let Some(pitch_sin) = domain.unit(t_3prime[(1, 1)] / biased_sin, "hip pitch") else {
                        continue;
                    };
                    let mut pitches = admitted(sine_pair(pitch_sin.asin()), &limits.hip_pitch).peekable();
                    if pitches.peek().is_none() {
                        continue;
                    }

                    // θ1: hip yaw-pitch, shared by every θ3 of this θ2
                    let yaws = match domain.unit(t_3prime[(0, 2)] / biased_sin, "hip yaw pitch") {
                        Some(yaw_cos) => {
                            let yaw = yaw_cos.acos();
                            [yaw + FRAC_PI_2, -yaw + FRAC_PI_2]
                                .map(|angle| limits.hip_yaw_pitch.contains(angle).then_some(angle))
                        }
                        None => [None, None],
                    };

                    let Some(hip_roll) = tree.add_hip_roll(ankle_pitch, theta2) else {
                        continue;
                    };
                    for theta3 in pitches {
                        let Some(hip_pitch) = tree.add_hip_pitch(hip_roll, theta3) else {
                            continue;
                        };
                        for theta1 in yaws.into_iter().flatten() {
                            tree.add_hip_yaw_pitch(hip_pitch, theta1);
                        }
                    }
                }
            }
        }
    }

    let mut set = tree.flatten();
    let combinations = set.len();
    set.retain(|angles| reaches(chain, angles, &t));
    let spurious = (combinations - set.len()) as u32;
    if spurious > 0 {
        trace!("Dropped {} of {} combinations that miss the target", spurious, combinations);
    }

    Candidates {
        set,
        domain_clamps: domain.clamps,
        spurious,
    }
}

/// Outcome of one leg solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegSolution {
    pub side: LegSide,
    /// Joint angles to command, θ1..θ6.
    pub joints: LegJoints,
    /// The same angles in solve order.
    pub angles: JointAngleSet,
    pub status: SolveStatus,
    /// Every limit-respecting configuration found for the target.
    pub candidates: CandidateSet,
    pub domain_clamps: u32,
    /// Distance in mm between the target position and the FK of `joints`.
    pub position_residual: f64,
}

impl LegSolution {
    pub fn is_feasible(&self) -> bool {
        self.status.is_feasible()
    }

    /// Strict variant: infeasible targets become an error instead of the
    /// previously accepted joints.
    pub fn into_result(self) -> Result<LegJoints, KinematicsError> {
        match self.status {
            SolveStatus::Infeasible => Err(KinematicsError::GeometricInfeasible { side: self.side }),
            _ => Ok(self.joints),
        }
    }
}

/// Pick one configuration out of `candidates`. Several valid ones resolve to
/// the nearest to `previous`; none falls back to `previous`.
fn select(candidates: &CandidateSet, previous: &JointAngleSet) -> (SolveStatus, JointAngleSet) {
    match candidates.nearest(previous) {
        None => (SolveStatus::Infeasible, *previous),
        Some((_, only)) if candidates.len() == 1 => (SolveStatus::Unique, *only),
        Some((index, best)) => {
            debug!(
                "{} valid configurations, picked #{} at distance {:.4} rad from the previous solution",
                candidates.len(),
                index,
                best.distance(previous)
            );
            (SolveStatus::ResolvedAmbiguous, *best)
        }
    }
}

/// Inverse kinematics for one leg, with its continuity state.
#[derive(Debug, Clone)]
pub struct LegSolver {
    chain: LegChain,
    limits: JointLimits,
    state: LegKinematicsState,
}

impl LegSolver {
    pub fn new(chain: LegChain, limits: JointLimits, standing: JointAngleSet) -> Self {
        Self {
            chain,
            limits,
            state: LegKinematicsState::new(standing),
        }
    }

    /// NAO dimensions and limits for `side`, starting from the standing pose.
    pub fn nao(side: LegSide) -> Self {
        let config = KinematicsConfig::default();
        Self::new(
            LegChain::new(side, config.dimensions),
            *config.limits(side),
            config.standing,
        )
    }

    pub fn side(&self) -> LegSide {
        self.chain.side()
    }

    pub fn chain(&self) -> &LegChain {
        &self.chain
    }

    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    pub fn state(&self) -> &LegKinematicsState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LegKinematicsState {
        &mut self.state
    }

    pub fn forward(&self, joints: &LegJoints) -> Pose {
        self.chain.forward(joints)
    }

    /// Solve for `target` and remember the result for the next call.
    ///
    /// Never fails: an unreachable target returns the last accepted joints
    /// with [`SolveStatus::Infeasible`].
    pub fn solve(&mut self, target: &Pose) -> LegSolution {
        let side = self.chain.side();
        let Candidates { set, domain_clamps, .. } = solve_candidates(&self.chain, &self.limits, target);
        let (status, angles) = select(&set, self.state.previous());

        if status == SolveStatus::Infeasible {
            warn!(
                "No valid {} leg configuration for target ({:.2}, {:.2}, {:.2}, {:.3}, {:.3}, {:.3}), holding previous joints",
                side, target.x, target.y, target.z, target.roll, target.pitch, target.yaw
            );
        }
        self.state.accept(status, angles, domain_clamps);

        let joints = angles.to_joints();
        let position_residual = (self.chain.forward(&joints).position() - target.position()).norm();

        LegSolution {
            side,
            joints,
            angles,
            status,
            candidates: set,
            domain_clamps,
            position_residual,
        }
    }
}

/// Inverse and forward kinematics for both legs.
///
/// ```rust,ignore
/// let mut solver = KinematicsSolver::default();
/// let solution = solver.inverse_leg(&Pose::new(0.0, 50.0, -300.0, 0.0, 0.0, 0.0), LegSide::Left);
/// for (motor, angle) in solution.joints.named(LegSide::Left) {
///     println!("{motor}: {angle:.4}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct KinematicsSolver {
    config: KinematicsConfig,
    left: LegSolver,
    right: LegSolver,
}

impl KinematicsSolver {
    /// Validate `config` and build both legs from it.
    pub fn new(config: KinematicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: KinematicsConfig) -> Self {
        let leg = |side| {
            LegSolver::new(
                LegChain::new(side, config.dimensions),
                *config.limits(side),
                config.standing,
            )
        };
        let left = leg(LegSide::Left);
        let right = leg(LegSide::Right);
        info!(
            "Leg kinematics ready: thigh={}mm, tibia={}mm, foot height={}mm",
            config.dimensions.thigh_length, config.dimensions.tibia_length, config.dimensions.foot_height
        );
        Self { config, left, right }
    }

    pub fn config(&self) -> &KinematicsConfig {
        &self.config
    }

    pub fn leg(&self, side: LegSide) -> &LegSolver {
        match side {
            LegSide::Left => &self.left,
            LegSide::Right => &self.right,
        }
    }

    pub fn leg_mut(&mut self, side: LegSide) -> &mut LegSolver {
        match side {
            LegSide::Left => &mut self.left,
            LegSide::Right => &mut self.right,
        }
    }

    /// Both legs as disjoint borrows, `(left, right)`.
    pub fn legs_mut(&mut self) -> (&mut LegSolver, &mut LegSolver) {
        (&mut self.left, &mut self.right)
    }

    pub fn inverse_leg(&mut self, target: &Pose, side: LegSide) -> LegSolution {
        self.leg_mut(side).solve(target)
    }

    /// Solve both feet for one control tick.
    pub fn inverse_legs(&mut self, left: &Pose, right: &Pose) -> (LegSolution, LegSolution) {
        (self.left.solve(left), self.right.solve(right))
    }

    pub fn forward_leg(&self, joints: &LegJoints, side: LegSide) -> Pose {
        self.leg(side).forward(joints)
    }

    /// Return both legs to the standing pose and clear their counters.
    pub fn reset(&mut self) {
        self.left.state_mut().reset();
        self.right.state_mut().reset();
    }
}

impl Default for KinematicsSolver {
    fn default() -> Self {
        Self::from_config(KinematicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot_config::STANDING_JOINTS;
    use approx::assert_abs_diff_eq;

    fn assert_angles_close(actual: &JointAngleSet, expected: &JointAngleSet, epsilon: f64) {
        for (a, e) in actual.0.iter().zip(expected.0.iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
        }
    }

    #[test]
    fn domain_guard_clamps_rounding_noise() {
        let mut domain = DomainGuard::default();
        assert_eq!(domain.unit(0.5, "test"), Some(0.5));
        assert_eq!(domain.unit(1.0, "test"), Some(1.0));
        assert_eq!(domain.clamps, 0);
        assert_eq!(domain.unit(1.0 + 1e-9, "test"), Some(1.0));
        assert_eq!(domain.unit(-1.0 - 1e-9, "test"), Some(-1.0));
        assert_eq!(domain.clamps, 2);
    }

    #[test]
    fn domain_guard_prunes_real_violations() {
        let mut domain = DomainGuard::default();
        assert_eq!(domain.unit(1.01, "test"), None);
        assert_eq!(domain.unit(f64::NAN, "test"), None);
        assert_eq!(domain.unit(f64::NEG_INFINITY, "test"), None);
        assert_eq!(domain.clamps, 0);
    }

    #[test]
    fn sine_pair_mirrors_about_quarter_turn() {
        let [a, b] = sine_pair(0.3);
        assert_eq!(a, 0.3);
        assert_abs_diff_eq!(b, PI - 0.3, epsilon = 1e-15);
        let [_, b] = sine_pair(-0.3);
        assert_abs_diff_eq!(b, -PI + 0.3, epsilon = 1e-15);
        let [_, b] = sine_pair(0.0);
        assert_eq!(b, PI);
    }

    #[test]
    fn reaches_rejects_wrong_hip_yaw_sign() {
        let chain = LegChain::nao(LegSide::Left);
        let angles = JointAngleSet::new([0.1, 0.9, -0.4, 0.1, -0.5, 0.3]);
        let target = chain.chain_transform(&angles.to_joints());
        assert!(reaches(&chain, &angles, &target));

        let flipped = JointAngleSet::new([0.1, 0.9, -0.4, 0.1, -0.5, -0.3]);
        assert!(!reaches(&chain, &flipped, &target));
    }

    #[test]
    fn standing_pose_is_unique() {
        for side in LegSide::BOTH {
            let mut solver = LegSolver::nao(side);
            let target = solver.forward(&STANDING_JOINTS.to_joints());
            let solution = solver.solve(&target);

            assert_eq!(solution.status, SolveStatus::Unique);
            assert_eq!(solution.candidates.len(), 1);
            assert_angles_close(&solution.angles, &STANDING_JOINTS, 1e-9);
            assert!(solution.position_residual < 1e-9);
        }
    }

    #[test]
    fn ambiguous_target_follows_previous_solution() {
        let original = JointAngleSet::new([0.0, 0.05, -0.02, 0.0, -0.03, 0.0]);
        // Knee bent backwards, compensated at the ankle and hip
        let twin = JointAngleSet::new([0.0, -0.05, 0.0292852, 0.0, 0.0207148, 0.0]);
        let chain = LegChain::nao(LegSide::Left);
        let target = chain.forward(&original.to_joints());

        let candidates = solve_candidates(&chain, &JointLimits::nao_left(), &target);
        assert_eq!(candidates.set.len(), 2);

        // From standing (knee bent forward) the positive-knee branch is closer
        let mut solver = LegSolver::nao(LegSide::Left);
        let solution = solver.solve(&target);
        assert_eq!(solution.status, SolveStatus::ResolvedAmbiguous);
        assert_angles_close(&solution.angles, &original, 1e-9);

        solver.state_mut().set_previous(twin);
        let solution = solver.solve(&target);
        assert_eq!(solution.status, SolveStatus::ResolvedAmbiguous);
        assert_angles_close(&solution.angles, &twin, 1e-6);
        assert!(solution.position_residual < 1e-6);
        assert_eq!(solver.state().stats().ambiguous, 2);
    }

    #[test]
    fn unreachable_target_holds_previous() {
        let mut solver = LegSolver::nao(LegSide::Left);
        let target = Pose::new(0.0, 50.0, -400.0, 0.0, 0.0, 0.0);
        let solution = solver.solve(&target);

        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.candidates.is_empty());
        assert_eq!(solution.angles, STANDING_JOINTS);
        assert_eq!(solver.state().previous(), &STANDING_JOINTS);
        assert_eq!(solver.state().stats().infeasible, 1);
        assert!(matches!(
            solution.into_result(),
            Err(KinematicsError::GeometricInfeasible { side: LegSide::Left })
        ));
    }

    #[test]
    fn non_finite_target_is_infeasible() {
        let mut solver = LegSolver::nao(LegSide::Right);
        let solution = solver.solve(&Pose::new(f64::NAN, -50.0, -300.0, 0.0, 0.0, 0.0));
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.angles.is_finite());
    }

    #[test]
    fn solver_uses_side_specific_state() {
        let mut solver = KinematicsSolver::default();
        let left = solver.forward_leg(&STANDING_JOINTS.to_joints(), LegSide::Left);
        solver.inverse_leg(&left, LegSide::Left);
        assert_eq!(solver.leg(LegSide::Left).state().stats().solves, 1);
        assert_eq!(solver.leg(LegSide::Right).state().stats().solves, 0);

        solver.reset();
        assert_eq!(solver.leg(LegSide::Left).state().stats().solves, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = KinematicsConfig::default();
        config.dimensions.thigh_length = -1.0;
        assert!(KinematicsSolver::new(config).is_err());
    }
}
