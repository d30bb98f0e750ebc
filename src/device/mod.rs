//! The gateway device: one session to a management controller, the sensors
//! discovered behind it and the points bound to them.
//!
//! All state lives in one [`DeviceState`] aggregate behind a single mutex. The
//! transport is part of that aggregate, so scans, initializations and live
//! queries are serialized: a read that starts after a scan released the lock
//! sees every descriptor that scan stored.

mod dump;
mod error;
mod query;
mod reader;
mod scan;
mod session;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

pub use error::{DeviceError, DumpError};

use crate::constants::defaults;
use crate::interfaces::{DeviceIdentity, PicmgProperties, Transport};
use crate::sensors::{
    DescriptorCache, PointBindings, PointId, PointMetadata, ProcessingMode, ReadingValue,
    RecordType, SensorDescriptor, SensorId, SlaveAddr,
};
use query::QueryFn;
use reader::{QueryJob, ReaderThread};

/// Host framework side of the point boundary.
///
/// Callbacks may run on the reader thread or, for metadata, while the device
/// lock is held; they must not call back into the device.
pub trait PointHost: Send + Sync {
    /// One-shot projection of a sensor descriptor onto a newly bound point
    fn fill_metadata(&self, point: PointId, metadata: PointMetadata);

    /// Completion of an asynchronous read
    fn read_complete(&self, point: PointId, result: Result<ReadingValue, DeviceError>);
}

/// A point as the host framework hands it over at initialization
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PointDef {
    pub id: PointId,
    pub link: String,
    #[serde(default)]
    pub mode: ProcessingMode,
}

impl PointDef {
    pub fn new(id: PointId, link: &str) -> Self {
        PointDef {
            id,
            link: link.to_string(),
            mode: ProcessingMode::Synchronous,
        }
    }

    pub fn asynchronous(id: PointId, link: &str) -> Self {
        PointDef {
            mode: ProcessingMode::Asynchronous,
            ..Self::new(id, link)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReadStatus {
    Done(ReadingValue),
    /// Result follows through [`PointHost::read_complete`]
    Queued,
}

pub(crate) struct DeviceState {
    transport: Box<dyn Transport>,
    connected: bool,
    picmg: Option<PicmgProperties>,
    local_addr: SlaveAddr,
    sensors: DescriptorCache,
    bindings: PointBindings,
    /// Every address that answered a full scan
    slaves: BTreeMap<SlaveAddr, DeviceIdentity>,
    scanned: bool,
}

pub(crate) struct DeviceInner {
    id: i16,
    state: Mutex<DeviceState>,
    host: Arc<dyn PointHost>,
}

impl DeviceInner {
    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        // Entries are replaced whole, so a panicked holder cannot leave a torn one
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Device {
    inner: Arc<DeviceInner>,
    reader: ReaderThread,
}

impl Device {
    pub fn new(
        id: i16,
        transport: Box<dyn Transport>,
        host: Arc<dyn PointHost>,
    ) -> std::io::Result<Self> {
        Self::with_queue_capacity(id, transport, host, defaults::QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(
        id: i16,
        transport: Box<dyn Transport>,
        host: Arc<dyn PointHost>,
        capacity: usize,
    ) -> std::io::Result<Self> {
        let inner = Arc::new(DeviceInner {
            id,
            state: Mutex::new(DeviceState {
                transport,
                connected: false,
                picmg: None,
                local_addr: defaults::BMC_ADDRESS,
                sensors: DescriptorCache::new(),
                bindings: PointBindings::new(),
                slaves: BTreeMap::new(),
                scanned: false,
            }),
            host,
        });
        let reader = ReaderThread::spawn(inner.clone(), capacity)?;
        Ok(Device { inner, reader })
    }

    pub fn id(&self) -> i16 {
        self.inner.id
    }

    /// Open a session; false on any failure, leaving the device unusable for
    /// queries until a later successful call
    pub fn connect(
        &self,
        host: &str,
        username: &str,
        password: &str,
        protocol: &str,
        privilege_level: i32,
    ) -> bool {
        let params = match session::session_params(host, username, password, protocol, privilege_level)
        {
            Ok(params) => params,
            Err(e) => {
                log::error!("Device {}: {}", self.inner.id, e);
                return false;
            }
        };
        match self.inner.lock().connect(&params) {
            Ok(()) => {
                log::info!(
                    "Device {}: connected to {} as '{}' over {}",
                    self.inner.id,
                    host,
                    username,
                    params.protocol
                );
                true
            }
            Err(e) => {
                log::error!("Device {}: connection to {} failed: {}", self.inner.id, host, e);
                false
            }
        }
    }

    pub fn ping(&self) -> bool {
        self.inner.lock().ping()
    }

    pub fn init_ai_record(&self, point: &PointDef) -> Result<Option<SensorId>, DeviceError> {
        self.init_input_record(point, RecordType::Ai)
    }

    pub fn init_mbbi_direct_record(
        &self,
        point: &PointDef,
    ) -> Result<Option<SensorId>, DeviceError> {
        self.init_input_record(point, RecordType::MbbiDirect)
    }

    pub fn init_mbbi_record(&self, point: &PointDef) -> Result<Option<SensorId>, DeviceError> {
        self.init_input_record(point, RecordType::Mbbi)
    }

    /// Register a point, scanning first if no scan ran yet. `Ok(None)` leaves
    /// the point unbound until a later scan discovers a matching sensor.
    pub fn init_record(
        &self,
        point: &PointDef,
        record_type: RecordType,
    ) -> Result<Option<SensorId>, DeviceError> {
        self.init_input_record(point, record_type)
    }

    fn init_input_record(
        &self,
        point: &PointDef,
        record_type: RecordType,
    ) -> Result<Option<SensorId>, DeviceError> {
        let host = self.inner.host.clone();
        self.inner
            .lock()
            .init_input_record(point, record_type, host.as_ref())
    }

    pub fn read_ai_sensor(&self, point: PointId) -> Result<ReadStatus, DeviceError> {
        self.read_sensor(point, RecordType::Ai, DeviceState::ai_query)
    }

    pub fn read_mbbi_direct_sensor(&self, point: PointId) -> Result<ReadStatus, DeviceError> {
        self.read_sensor(point, RecordType::MbbiDirect, DeviceState::mbbi_direct_query)
    }

    pub fn read_mbbi_sensor(&self, point: PointId) -> Result<ReadStatus, DeviceError> {
        self.read_sensor(point, RecordType::Mbbi, DeviceState::mbbi_query)
    }

    /// Read through the entry point matching the record type
    pub fn read(&self, point: PointId, record_type: RecordType) -> Result<ReadStatus, DeviceError> {
        match record_type {
            RecordType::Ai => self.read_ai_sensor(point),
            RecordType::MbbiDirect => self.read_mbbi_direct_sensor(point),
            RecordType::Mbbi => self.read_mbbi_sensor(point),
        }
    }

    fn read_sensor(
        &self,
        point: PointId,
        record_type: RecordType,
        query: QueryFn,
    ) -> Result<ReadStatus, DeviceError> {
        let mut state = self.inner.lock();
        let (sensor, mode) = state.bound_sensor(point, record_type)?;
        match mode {
            ProcessingMode::Synchronous => query(&mut *state, &sensor).map(ReadStatus::Done),
            ProcessingMode::Asynchronous => {
                drop(state);
                self.reader.queue(QueryJob {
                    sensor,
                    query,
                    point,
                })?;
                Ok(ReadStatus::Queued)
            }
        }
    }

    /// Full scan of every address reachable from the local controller
    pub fn detect_sensors(&self) -> Result<usize, DeviceError> {
        let host = self.inner.host.clone();
        self.inner.lock().detect_sensors(host.as_ref())
    }

    /// Rescan only the addresses owning bound points
    pub fn scan_active_ipmbs(&self) -> Result<usize, DeviceError> {
        let host = self.inner.host.clone();
        self.inner.lock().scan_active_ipmbs(host.as_ref())
    }

    /// Full scan, then write descriptors and bindings to `path` as JSON
    pub fn dump_database(&self, path: impl AsRef<Path>) -> Result<(), DumpError> {
        let path = path.as_ref();
        let host = self.inner.host.clone();
        let contents = self.inner.lock().dump(self.inner.id, host.as_ref())?;
        std::fs::write(path, contents).map_err(|e| {
            log::error!(
                "Device {}: writing dump to {} failed: {}",
                self.inner.id,
                path.display(),
                e
            );
            DumpError::Io(e)
        })?;
        log::info!("Device {}: database dumped to {}", self.inner.id, path.display());
        Ok(())
    }

    pub fn sensor_descriptor(&self, sensor: &SensorId) -> Option<SensorDescriptor> {
        self.inner.lock().sensors.get(sensor).cloned()
    }

    pub fn sensor_descriptors(&self) -> Vec<SensorDescriptor> {
        self.inner.lock().sensors.iter().cloned().collect()
    }

    pub fn binding(&self, point: PointId) -> Option<SensorId> {
        self.inner.lock().bindings.get(point).and_then(|e| e.sensor)
    }

    pub fn active_ipmbs(&self) -> BTreeSet<SlaveAddr> {
        self.inner.lock().bindings.active_ipmbs().clone()
    }

    pub fn known_ipmbs(&self) -> BTreeSet<SlaveAddr> {
        self.inner.lock().slaves.keys().copied().collect()
    }

    pub fn local_address(&self) -> SlaveAddr {
        self.inner.lock().local_addr
    }

    pub fn picmg(&self) -> Option<PicmgProperties> {
        self.inner.lock().picmg
    }

    /// Stop accepting asynchronous reads, let the in-flight one finish and
    /// cancel the rest
    pub fn shutdown(&self) {
        self.reader.shutdown();
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.reader.shutdown();
        self.inner.lock().disconnect();
    }
}

impl DeviceState {
    /// Sensor and processing mode of a bound point of the given kind
    fn bound_sensor(
        &self,
        point: PointId,
        record_type: RecordType,
    ) -> Result<(SensorId, ProcessingMode), DeviceError> {
        let entry = self
            .bindings
            .get(point)
            .ok_or(DeviceError::UnknownPoint(point))?;
        if entry.record_type != record_type {
            return Err(DeviceError::WrongRecordType {
                point,
                expected: record_type,
                actual: entry.record_type,
            });
        }
        let sensor = entry.sensor.ok_or(DeviceError::UnboundPoint(point))?;
        Ok((sensor, entry.mode))
    }
}
