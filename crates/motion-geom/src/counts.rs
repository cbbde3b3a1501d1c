// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene-level geometry statistics that instances contribute to.

/// Cost category of an instance, used by scene statistics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstanceCost {
    /// Instances of sub-scenes that are cheap to traverse.
    #[default]
    Cheap,
    /// Instances of sub-scenes with expensive primitives (curves, user geometry).
    Expensive,
}

/// Aggregate primitive counters owned by the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct GeometryCounts {
    /// Cheap instances with a single time step.
    pub instances_cheap: usize,
    /// Expensive instances with a single time step.
    pub instances_expensive: usize,
    /// Cheap motion-blurred instances.
    pub mb_instances_cheap: usize,
    /// Expensive motion-blurred instances.
    pub mb_instances_expensive: usize,
}

impl GeometryCounts {
    /// Adds `primitives` to the counter selected by `cost` and
    /// `motion_blurred`.
    pub fn add_instances(&mut self, cost: InstanceCost, motion_blurred: bool, primitives: usize) {
        let slot = match (cost, motion_blurred) {
            (InstanceCost::Cheap, false) => &mut self.instances_cheap,
            (InstanceCost::Cheap, true) => &mut self.mb_instances_cheap,
            (InstanceCost::Expensive, false) => &mut self.instances_expensive,
            (InstanceCost::Expensive, true) => &mut self.mb_instances_expensive,
        };
        *slot += primitives;
    }

    /// Sum over all categories.
    pub fn total(&self) -> usize {
        self.instances_cheap
            + self.instances_expensive
            + self.mb_instances_cheap
            + self.mb_instances_expensive
    }
}
