//! Fixed-depth arena of candidate angles.
//!
//! Each analytic stage yields at most two candidates per parent, so the
//! capacity of every stage is known up front: θ6:1, θ4:2, θ5:4, θ2:8, θ3:16,
//! θ1:32. Nodes store their angle and the index of their parent in the
//! previous stage. Only paths reaching a θ1 node are full solutions.

use crate::types::JointAngleSet;

/// Upper bound on the number of full 6-angle combinations per solve.
pub const MAX_COMBINATIONS: usize = 32;

#[derive(Debug, Clone, Copy)]
struct Stage<const N: usize> {
    angles: [f64; N],
    parents: [u8; N],
    len: usize,
}

impl<const N: usize> Stage<N> {
    const fn new() -> Self {
        Self {
            angles: [0.0; N],
            parents: [0; N],
            len: 0,
        }
    }

    /// Returns the index of the new node, or `None` when the stage is full.
    fn push(&mut self, parent: usize, angle: f64) -> Option<usize> {
        if self.len == N {
            return None;
        }
        let index = self.len;
        self.angles[index] = angle;
        self.parents[index] = parent as u8;
        self.len += 1;
        Some(index)
    }

    fn angle(&self, index: usize) -> f64 {
        self.angles[index]
    }

    fn parent(&self, index: usize) -> usize {
        self.parents[index] as usize
    }
}

/// Candidate angles of one solve, grouped by stage in solve order.
#[derive(Debug, Clone, Copy)]
pub struct SolutionTree {
    ankle_roll: Stage<1>,
    knee_pitch: Stage<2>,
    ankle_pitch: Stage<4>,
    hip_roll: Stage<8>,
    hip_pitch: Stage<16>,
    hip_yaw_pitch: Stage<32>,
}

impl SolutionTree {
    pub const fn new() -> Self {
        Self {
            ankle_roll: Stage::new(),
            knee_pitch: Stage::new(),
            ankle_pitch: Stage::new(),
            hip_roll: Stage::new(),
            hip_pitch: Stage::new(),
            hip_yaw_pitch: Stage::new(),
        }
    }

    /// θ6, the root of the tree.
    pub fn add_ankle_roll(&mut self, angle: f64) -> Option<usize> {
        self.ankle_roll.push(0, angle)
    }

    /// θ4 under the given θ6 node.
    pub fn add_knee_pitch(&mut self, ankle_roll: usize, angle: f64) -> Option<usize> {
        self.knee_pitch.push(ankle_roll, angle)
    }

    /// θ5 under the given θ4 node.
    pub fn add_ankle_pitch(&mut self, knee_pitch: usize, angle: f64) -> Option<usize> {
        self.ankle_pitch.push(knee_pitch, angle)
    }

    /// θ2 under the given θ5 node.
    pub fn add_hip_roll(&mut self, ankle_pitch: usize, angle: f64) -> Option<usize> {
        self.hip_roll.push(ankle_pitch, angle)
    }

    /// θ3 under the given θ2 node.
    pub fn add_hip_pitch(&mut self, hip_roll: usize, angle: f64) -> Option<usize> {
        self.hip_pitch.push(hip_roll, angle)
    }

    /// θ1 under the given θ3 node.
    pub fn add_hip_yaw_pitch(&mut self, hip_pitch: usize, angle: f64) -> Option<usize> {
        self.hip_yaw_pitch.push(hip_pitch, angle)
    }

    /// Number of complete root-to-leaf paths.
    pub fn leaf_count(&self) -> usize {
        self.hip_yaw_pitch.len
    }

    /// Every complete path as a solve-order angle set.
    ///
    /// Nodes are appended depth-first, so walking the θ1 stage in index
    /// order yields the combinations in depth-first order as well.
    pub fn flatten(&self) -> CandidateSet {
        let mut candidates = CandidateSet::new();
        for leaf in 0..self.hip_yaw_pitch.len {
            let theta1 = self.hip_yaw_pitch.angle(leaf);
            let hip_pitch = self.hip_yaw_pitch.parent(leaf);
            let theta3 = self.hip_pitch.angle(hip_pitch);
            let hip_roll = self.hip_pitch.parent(hip_pitch);
            let theta2 = self.hip_roll.angle(hip_roll);
            let ankle_pitch = self.hip_roll.parent(hip_roll);
            let theta5 = self.ankle_pitch.angle(ankle_pitch);
            let knee_pitch = self.ankle_pitch.parent(ankle_pitch);
            let theta4 = self.knee_pitch.angle(knee_pitch);
            let ankle_roll = self.knee_pitch.parent(knee_pitch);
            let theta6 = self.ankle_roll.angle(ankle_roll);

            candidates.push(JointAngleSet::new([theta6, theta4, theta5, theta2, theta3, theta1]));
        }
        candidates
    }
}

impl Default for SolutionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Full 6-angle combinations of one solve, in depth-first order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateSet {
    entries: [JointAngleSet; MAX_COMBINATIONS],
    len: usize,
}

impl CandidateSet {
    pub const fn new() -> Self {
        Self {
            entries: [JointAngleSet::new([0.0; 6]); MAX_COMBINATIONS],
            len: 0,
        }
    }

    /// Appends a combination. Returns `false` when the set is full.
    pub fn push(&mut self, angles: JointAngleSet) -> bool {
        if self.len == MAX_COMBINATIONS {
            return false;
        }
        self.entries[self.len] = angles;
        self.len += 1;
        true
    }

    /// Keep only the combinations for which `keep` holds, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&JointAngleSet) -> bool) {
        let mut kept = 0;
        for index in 0..self.len {
            let angles = self.entries[index];
            if keep(&angles) {
                self.entries[kept] = angles;
                kept += 1;
            }
        }
        self.len = kept;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[JointAngleSet] {
        &self.entries[..self.len]
    }

    pub fn get(&self, index: usize) -> Option<&JointAngleSet> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JointAngleSet> {
        self.as_slice().iter()
    }

    /// The combination closest to `reference`. The first one wins on ties.
    pub fn nearest(&self, reference: &JointAngleSet) -> Option<(usize, &JointAngleSet)> {
        let (first, rest) = self.as_slice().split_first()?;

        let mut best_index = 0;
        let mut best_solution = first;
        let mut min_distance = first.distance(reference);

        for (offset, solution) in rest.iter().enumerate() {
            let distance = solution.distance(reference);
            if distance < min_distance {
                min_distance = distance;
                best_index = offset + 1;
                best_solution = solution;
            }
        }

        Some((best_index, best_solution))
    }
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a JointAngleSet;
    type IntoIter = std::slice::Iter<'a, JointAngleSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
