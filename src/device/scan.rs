//! Bus enumeration and point resolution
//!
//! Both scan modes run with the device lock held for the whole walk, so a read
//! never interleaves with a half-refreshed address.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::interfaces::{
    CompactSensorRecord, DeviceIdentity, FullSensorRecord, SdrRecord, SdrSource,
};
use crate::sensors::records::record_functions;
use crate::sensors::{
    PointBindings, PointId, PointLink, RecordType, SensorDescriptor, SensorId, SlaveAddr,
};

use super::{DeviceError, DeviceState, PointDef, PointHost};

/// First and last IPMB-0 slave address probed on an ATCA shelf
const IPMB_FIRST: u8 = 0x10;
const IPMB_LAST: u8 = 0xee;

impl DeviceState {
    pub(super) fn detect_sensors(&mut self, host: &dyn PointHost) -> Result<usize, DeviceError> {
        if !self.connected {
            return Err(DeviceError::NotConnected);
        }
        let candidates: Vec<SlaveAddr> = if self.picmg.is_some() {
            (IPMB_FIRST..=IPMB_LAST).step_by(2).map(SlaveAddr).collect()
        } else {
            vec![self.local_addr]
        };

        let mut found = Vec::new();
        let mut stored = 0;
        for addr in candidates {
            let identity = match self.transport.device_identity(addr) {
                Ok(identity) => identity,
                Err(e) if addr == self.local_addr => {
                    log::warn!("Local controller {} did not identify itself: {}", addr, e);
                    DeviceIdentity {
                        device_id: 0,
                        revision: 0,
                        device_sdrs: false,
                    }
                }
                Err(e) => {
                    log::debug!("Address {} absent: {}", addr, e);
                    continue;
                }
            };
            log::debug!(
                "Address {} responded, device id 0x{:02x} rev {}",
                addr,
                identity.device_id,
                identity.revision
            );
            self.slaves.insert(addr, identity);
            found.push(addr);
            stored += self.iterate_sdrs(addr, host);
        }
        self.scanned = true;
        self.resolve_pending(host);

        log::info!(
            "Full scan found {} controller(s) [{}], {} sensor(s) stored",
            found.len(),
            found.iter().join(", "),
            stored
        );
        Ok(stored)
    }

    pub(super) fn scan_active_ipmbs(&mut self, host: &dyn PointHost) -> Result<usize, DeviceError> {
        if !self.connected {
            return Err(DeviceError::NotConnected);
        }
        let active: Vec<SlaveAddr> = self.bindings.active_ipmbs().iter().copied().collect();
        let stored: usize = active
            .iter()
            .map(|addr| self.iterate_sdrs(*addr, host))
            .sum();
        self.resolve_pending(host);

        log::debug!(
            "Active scan of [{}] refreshed {} sensor(s)",
            active.iter().join(", "),
            stored
        );
        Ok(stored)
    }

    /// Walk the descriptor table of one controller; returns the number of
    /// sensor descriptors stored
    fn iterate_sdrs(&mut self, addr: SlaveAddr, host: &dyn PointHost) -> usize {
        let own_sdrs = self
            .slaves
            .get(&addr)
            .map_or(false, |identity| identity.device_sdrs);
        let source = if own_sdrs && addr != self.local_addr {
            SdrSource::Device
        } else {
            SdrSource::Repository
        };
        let records = match self.transport.sdr_records(addr, source) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Could not read descriptors of {}: {}", addr, e);
                return 0;
            }
        };

        let mut seen = BTreeSet::new();
        for record in records {
            match record {
                SdrRecord::Full(rec) => {
                    seen.insert(self.handle_full_sensor(addr, &rec, host));
                }
                SdrRecord::Compact(rec) => {
                    seen.insert(self.handle_compact_sensor(addr, &rec, host));
                }
                SdrRecord::Other { record_type } => {
                    log::trace!("Skipping record type 0x{:02x} on {}", record_type, addr);
                }
            }
        }
        self.drop_vanished(addr, &seen);
        seen.len()
    }

    /// Forget descriptors of `addr` its latest table no longer lists
    fn drop_vanished(&mut self, addr: SlaveAddr, seen: &BTreeSet<SensorId>) {
        let vanished: Vec<SensorId> = self
            .sensors
            .on_ipmb(addr)
            .map(|d| d.id)
            .filter(|id| !seen.contains(id))
            .collect();
        for id in vanished {
            self.sensors.remove(&id);
            let points: Vec<PointId> = self.bindings.points_for(&id).collect();
            if points.is_empty() {
                log::debug!("Sensor {} no longer listed, dropped", id);
            } else {
                log::warn!(
                    "Sensor {} no longer listed; point(s) {} now stale",
                    id,
                    points.iter().join(", ")
                );
            }
        }
    }

    fn handle_full_sensor(
        &mut self,
        addr: SlaveAddr,
        rec: &FullSensorRecord,
        host: &dyn PointHost,
    ) -> SensorId {
        self.store_descriptor(SensorDescriptor::from_full(addr, rec), host)
    }

    fn handle_compact_sensor(
        &mut self,
        addr: SlaveAddr,
        rec: &CompactSensorRecord,
        host: &dyn PointHost,
    ) -> SensorId {
        self.store_descriptor(SensorDescriptor::from_compact(addr, rec), host)
    }

    fn store_descriptor(&mut self, desc: SensorDescriptor, host: &dyn PointHost) -> SensorId {
        log::debug!(
            "Sensor {} '{}' ({:?}, unit '{}')",
            desc.id,
            desc.name,
            desc.kind,
            desc.unit
        );
        let id = desc.id;
        self.sensors.insert(desc);
        self.fill_points_from_sdr(&id, host);
        id
    }

    /// Bind points waiting for exactly this sensor, then project metadata onto
    /// every point on it that has none yet
    fn fill_points_from_sdr(&mut self, id: &SensorId, host: &dyn PointHost) {
        let Some(desc) = self.sensors.get(id) else {
            return;
        };
        let waiting: Vec<PointId> = self
            .bindings
            .iter()
            .filter(|(_, e)| e.sensor.is_none() && e.link.concrete() == Some(*id))
            .map(|(point, _)| point)
            .collect();
        for point in waiting {
            self.bindings.bind(point, *id);
        }
        let points: Vec<PointId> = self.bindings.points_for(id).collect();
        for point in points {
            fill_point(&mut self.bindings, point, desc, host);
        }
    }

    /// Sensor a link resolves to against the current cache
    fn resolve_link(&self, link: &PointLink, record_type: RecordType) -> Option<SensorId> {
        if let Some(id) = link.concrete() {
            return self.sensors.contains(&id).then_some(id);
        }
        let mut candidates = self
            .sensors
            .iter()
            .filter(|d| link.matches(&d.id) && d.suits(record_type))
            .map(|d| d.id)
            .peekable();
        let first = *candidates.peek()?;
        let unused = candidates.find(|id| !self.bindings.is_sensor_bound(id));
        Some(unused.unwrap_or(first))
    }

    fn resolve_point(&mut self, point: PointId, host: &dyn PointHost) -> Option<SensorId> {
        let entry = self.bindings.get(point)?;
        if let Some(sensor) = entry.sensor {
            return Some(sensor);
        }
        let sensor = self.resolve_link(&entry.link, entry.record_type)?;
        self.bindings.bind(point, sensor);
        log::debug!("Point {} bound to sensor {}", point, sensor);
        if let Some(desc) = self.sensors.get(&sensor) {
            fill_point(&mut self.bindings, point, desc, host);
        }
        Some(sensor)
    }

    fn resolve_pending(&mut self, host: &dyn PointHost) {
        for point in self.bindings.pending() {
            self.resolve_point(point, host);
        }
    }

    pub(super) fn init_input_record(
        &mut self,
        point: &PointDef,
        record_type: RecordType,
        host: &dyn PointHost,
    ) -> Result<Option<SensorId>, DeviceError> {
        let link: PointLink = point.link.parse().map_err(|source| DeviceError::Link {
            point: point.id,
            source,
        })?;
        if !self.bindings.register(point.id, record_type, link, point.mode) {
            return Err(DeviceError::DuplicatePoint(point.id));
        }

        if self.connected && !self.scanned {
            if let Err(e) = self.detect_sensors(host) {
                log::warn!("Initial scan failed: {}", e);
            }
        } else {
            self.resolve_point(point.id, host);
        }

        let sensor = self.bindings.get(point.id).and_then(|e| e.sensor);
        if sensor.is_none() {
            log::warn!(
                "Point {} ({} '{}') has no matching sensor yet",
                point.id,
                record_type,
                link
            );
        }
        Ok(sensor)
    }
}

fn fill_point(
    bindings: &mut PointBindings,
    point: PointId,
    desc: &SensorDescriptor,
    host: &dyn PointHost,
) {
    let Some(entry) = bindings.get(point) else {
        return;
    };
    if entry.filled {
        return;
    }
    let functions = record_functions(desc.kind, entry.record_type);
    host.fill_metadata(point, (functions.fill)(desc));
    bindings.mark_filled(point);
}
