//! Point-to-sensor binding table
//!
//! Points are owned by the host framework and only referenced here by id.
//! A point is registered unbound, bound at most once, and its owning bus
//! address then becomes active.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::link::PointLink;
use super::models::{RecordType, SensorId, SlaveAddr};

/// Framework-assigned point id
pub type PointId = u32;

/// How reads of a point are answered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// The read call performs the bus round-trip itself
    #[default]
    Synchronous,
    /// The read call queues a job; the value arrives through the host callback
    Asynchronous,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointEntry {
    pub record_type: RecordType,
    pub link: PointLink,
    pub mode: ProcessingMode,
    pub sensor: Option<SensorId>,
    /// Metadata was projected onto the point
    pub filled: bool,
}

#[derive(Debug, Default)]
pub struct PointBindings {
    points: BTreeMap<PointId, PointEntry>,
    by_sensor: BTreeMap<SensorId, BTreeSet<PointId>>,
    active: BTreeSet<SlaveAddr>,
}

impl PointBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unbound point; false if the id is taken
    pub fn register(
        &mut self,
        id: PointId,
        record_type: RecordType,
        link: PointLink,
        mode: ProcessingMode,
    ) -> bool {
        if self.points.contains_key(&id) {
            return false;
        }
        self.points.insert(
            id,
            PointEntry {
                record_type,
                link,
                mode,
                sensor: None,
                filled: false,
            },
        );
        true
    }

    /// Bind a registered, unbound point; bindings never change afterwards
    pub fn bind(&mut self, id: PointId, sensor: SensorId) -> bool {
        let Some(entry) = self.points.get_mut(&id) else {
            return false;
        };
        if entry.sensor.is_some() {
            return false;
        }
        entry.sensor = Some(sensor);
        self.by_sensor.entry(sensor).or_default().insert(id);
        self.active.insert(sensor.ipmb);
        true
    }

    pub fn get(&self, id: PointId) -> Option<&PointEntry> {
        self.points.get(&id)
    }

    pub fn mark_filled(&mut self, id: PointId) {
        if let Some(entry) = self.points.get_mut(&id) {
            entry.filled = true;
        }
    }

    pub fn points_for(&self, sensor: &SensorId) -> impl Iterator<Item = PointId> + '_ {
        self.by_sensor.get(sensor).into_iter().flatten().copied()
    }

    pub fn is_sensor_bound(&self, sensor: &SensorId) -> bool {
        self.by_sensor.contains_key(sensor)
    }

    /// Points still waiting for their sensor, in id order
    pub fn pending(&self) -> Vec<PointId> {
        self.points
            .iter()
            .filter(|(_, e)| e.sensor.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Addresses owning at least one bound point
    pub fn active_ipmbs(&self) -> &BTreeSet<SlaveAddr> {
        &self.active
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointId, &PointEntry)> {
        self.points.iter().map(|(id, e)| (*id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings_with(ids: &[PointId]) -> PointBindings {
        let mut b = PointBindings::new();
        for id in ids {
            assert!(b.register(*id, RecordType::Ai, PointLink::ANY, ProcessingMode::default()));
        }
        b
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let mut b = bindings_with(&[1]);
        assert!(!b.register(1, RecordType::Mbbi, PointLink::ANY, ProcessingMode::Asynchronous));
        assert_eq!(b.get(1).unwrap().record_type, RecordType::Ai);
    }

    #[test]
    fn test_many_points_per_sensor() {
        let mut b = bindings_with(&[1, 2, 3]);
        let sensor = SensorId::new(0x82, 4);
        assert!(b.bind(1, sensor));
        assert!(b.bind(3, sensor));

        assert_eq!(b.points_for(&sensor).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(b.pending(), vec![2]);
        assert!(b.active_ipmbs().contains(&SlaveAddr(0x82)));
        assert_eq!(b.active_ipmbs().len(), 1);
    }

    #[test]
    fn test_binding_is_immutable() {
        let mut b = bindings_with(&[1]);
        assert!(b.bind(1, SensorId::new(0x20, 3)));
        assert!(!b.bind(1, SensorId::new(0x82, 3)));
        assert_eq!(b.get(1).unwrap().sensor, Some(SensorId::new(0x20, 3)));
        assert!(!b.is_sensor_bound(&SensorId::new(0x82, 3)));
        assert!(!b.active_ipmbs().contains(&SlaveAddr(0x82)));
    }

    #[test]
    fn test_bind_unknown_point() {
        let mut b = PointBindings::new();
        assert!(!b.bind(9, SensorId::new(0x20, 3)));
        assert!(b.active_ipmbs().is_empty());
    }
}
