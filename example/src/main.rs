// Drives both NAO legs through a short squat-and-sway sequence and prints
// the resulting joint commands as JSON lines.
// Run with: cargo run -p example [-- path/to/config.json]

use std::error::Error;

use nao_kinematics::{
    KinematicsConfig, KinematicsSolver, LegSide, LegSolution, Pose, SolveStatus, STANDING_JOINTS,
};
use serde::Serialize;
use tracing::{info, warn};

const SQUAT_DEPTH: f64 = 25.0;
const SWAY_WIDTH: f64 = 15.0;
const STEPS: usize = 20;

/// One line of output: the command for one leg at one tick.
#[derive(Serialize)]
struct JointCommand {
    tick: usize,
    side: LegSide,
    status: SolveStatus,
    motors: Vec<(&'static str, f64)>,
    residual_mm: f64,
}

impl JointCommand {
    fn new(tick: usize, solution: &LegSolution) -> Self {
        Self {
            tick,
            side: solution.side,
            status: solution.status,
            motors: solution.joints.named(solution.side).to_vec(),
            residual_mm: solution.position_residual,
        }
    }
}

/// Foot targets for one tick, `(left, right)`.
fn targets(solver: &KinematicsSolver, tick: usize) -> (Pose, Pose) {
    let standing = STANDING_JOINTS.to_joints();
    let left = solver.forward_leg(&standing, LegSide::Left);
    let right = solver.forward_leg(&standing, LegSide::Right);

    let phase = tick as f64 / STEPS as f64 * std::f64::consts::TAU;
    let lift = SQUAT_DEPTH * (1.0 - phase.cos()) / 2.0;
    let sway = SWAY_WIDTH * phase.sin();

    let shift = |pose: Pose| Pose {
        y: pose.y - sway,
        z: pose.z + lift,
        ..pose
    };
    (shift(left), shift(right))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            KinematicsConfig::load(&path)?
        }
        None => KinematicsConfig::default(),
    };
    let mut solver = KinematicsSolver::new(config)?;

    for tick in 0..=STEPS {
        let (left, right) = targets(&solver, tick);
        let (left, right) = solver.inverse_legs(&left, &right);
        for solution in [&left, &right] {
            println!("{}", serde_json::to_string(&JointCommand::new(tick, solution))?);
        }
    }

    // Out of reach: both legs hold their last command
    let unreachable = Pose::new(0.0, 50.0, -400.0, 0.0, 0.0, 0.0);
    let solution = solver.inverse_leg(&unreachable, LegSide::Left);
    if let Err(e) = solution.into_result() {
        warn!("{}", e);
    }
    println!("{}", serde_json::to_string(&JointCommand::new(STEPS + 1, &solution))?);

    for side in LegSide::BOTH {
        let stats = solver.leg(side).state().stats();
        info!(
            "{} leg: {} solves, {} unique, {} ambiguous, {} infeasible, {} clamped trig arguments",
            side, stats.solves, stats.unique, stats.ambiguous, stats.infeasible, stats.domain_clamps
        );
    }

    Ok(())
}
