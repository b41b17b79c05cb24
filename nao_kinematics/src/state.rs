// Per-leg continuity state carried between solves.

use serde::{Deserialize, Serialize};

use crate::robot_config::STANDING_JOINTS;
use crate::types::JointAngleSet;

/// How a solve ended.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Exactly one combination satisfied every joint limit.
    Unique,
    /// Several combinations were valid; the one nearest the previous solution won.
    ResolvedAmbiguous,
    /// Nothing was valid; the previous solution was returned unchanged.
    Infeasible,
}

impl SolveStatus {
    pub fn is_feasible(self) -> bool {
        !matches!(self, SolveStatus::Infeasible)
    }
}

/// Running counters for one leg.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    pub solves: u64,
    pub unique: u64,
    pub ambiguous: u64,
    pub infeasible: u64,
    pub domain_clamps: u64,
}

impl SolveStats {
    pub fn record(&mut self, status: SolveStatus, domain_clamps: u32) {
        self.solves += 1;
        match status {
            SolveStatus::Unique => self.unique += 1,
            SolveStatus::ResolvedAmbiguous => self.ambiguous += 1,
            SolveStatus::Infeasible => self.infeasible += 1,
        }
        self.domain_clamps += u64::from(domain_clamps);
    }
}

/// Last accepted solution of one leg, in solve order, plus its counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegKinematicsState {
    previous: JointAngleSet,
    standing: JointAngleSet,
    stats: SolveStats,
}

impl LegKinematicsState {
    /// State seeded with `standing`, which is also what [`reset`](Self::reset) returns to.
    pub fn new(standing: JointAngleSet) -> Self {
        Self {
            previous: standing,
            standing,
            stats: SolveStats::default(),
        }
    }

    /// Seed the previous solution explicitly, keeping the reset pose.
    pub fn with_previous(mut self, previous: JointAngleSet) -> Self {
        self.previous = previous;
        self
    }

    pub fn previous(&self) -> &JointAngleSet {
        &self.previous
    }

    pub fn set_previous(&mut self, previous: JointAngleSet) {
        self.previous = previous;
    }

    pub fn standing(&self) -> &JointAngleSet {
        &self.standing
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Back to the standing pose with cleared counters.
    pub fn reset(&mut self) {
        self.previous = self.standing;
        self.stats = SolveStats::default();
    }

    /// Book a finished solve. Feasible results become the new previous solution.
    pub(crate) fn accept(&mut self, status: SolveStatus, angles: JointAngleSet, domain_clamps: u32) {
        if status.is_feasible() {
            self.previous = angles;
        }
        self.stats.record(status, domain_clamps);
    }
}

impl Default for LegKinematicsState {
    fn default() -> Self {
        Self::new(STANDING_JOINTS)
    }
}
