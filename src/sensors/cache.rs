use std::collections::BTreeMap;

use super::models::{SensorDescriptor, SensorId, SlaveAddr};

/// Last-known descriptor per sensor, ordered by identity
#[derive(Debug, Default)]
pub struct DescriptorCache {
    sensors: BTreeMap<SensorId, SensorDescriptor>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the whole entry; returns the previous descriptor
    pub fn insert(&mut self, descriptor: SensorDescriptor) -> Option<SensorDescriptor> {
        self.sensors.insert(descriptor.id, descriptor)
    }

    pub fn get(&self, id: &SensorId) -> Option<&SensorDescriptor> {
        self.sensors.get(id)
    }

    pub fn contains(&self, id: &SensorId) -> bool {
        self.sensors.contains_key(id)
    }

    pub fn remove(&mut self, id: &SensorId) -> Option<SensorDescriptor> {
        self.sensors.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorDescriptor> {
        self.sensors.values()
    }

    /// Descriptors owned by one controller, across all of its LUNs
    pub fn on_ipmb(&self, ipmb: SlaveAddr) -> impl Iterator<Item = &SensorDescriptor> {
        let first = SensorId {
            ipmb,
            lun: 0,
            number: 0,
        };
        let last = SensorId {
            ipmb,
            lun: u8::MAX,
            number: u8::MAX,
        };
        self.sensors.range(first..=last).map(|(_, d)| d)
    }
}
