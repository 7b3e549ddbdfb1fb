use std::collections::HashMap;

use crate::run::{RunConfig, RunMeasurements};

/// Append-only multi-map from configuration to the runs measured under it.
///
/// Groups iterate in the order their configuration was first seen, runs
/// within a group in insertion order.
#[derive(Debug, Default)]
pub struct GroupedRuns {
    index: HashMap<RunConfig, usize>,
    groups: Vec<(RunConfig, Vec<RunMeasurements>)>,
}

impl GroupedRuns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, measurements: RunMeasurements) {
        let config = measurements.config;
        let idx = *self.index.entry(config).or_insert_with(|| {
            self.groups.push((config, Vec::new()));
            self.groups.len() - 1
        });
        self.groups[idx].1.push(measurements);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RunConfig, &[RunMeasurements])> {
        self.groups
            .iter()
            .map(|(config, runs)| (config, runs.as_slice()))
    }

    /// Number of distinct configurations
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<RunMeasurements> for GroupedRuns {
    fn from_iter<T: IntoIterator<Item = RunMeasurements>>(iter: T) -> Self {
        let mut grouped = GroupedRuns::new();
        for measurements in iter {
            grouped.insert(measurements);
        }
        grouped
    }
}
