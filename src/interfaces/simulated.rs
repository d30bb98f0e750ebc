//! In-memory shelf used on the bench and in tests
//!
//! Describes a set of controllers on IPMB-0 together with their descriptor
//! tables and current readings. Every protocol exchange is recorded so callers
//! can assert which addresses were touched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::sdr::{SdrRecord, SensorReading};
use super::session::{
    DeviceIdentity, PicmgProperties, SdrSource, SessionParams, Transport, TransportError,
};
use crate::sensors::models::SlaveAddr;

/// Failure injected for a sensor reading
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimFailure {
    Timeout,
    NoResponse,
    Completion(u8),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SimSensor {
    pub sensor: u8,
    #[serde(default)]
    pub lun: u8,
    #[serde(flatten)]
    pub reading: SensorReading,
    #[serde(default)]
    pub fail: Option<SimFailure>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SimController {
    pub address: SlaveAddr,
    #[serde(default = "default_identity")]
    pub identity: DeviceIdentity,
    #[serde(default = "default_true")]
    pub responding: bool,
    #[serde(default)]
    pub sdrs: Vec<SdrRecord>,
    #[serde(default)]
    pub readings: Vec<SimSensor>,
}

/// Shelf description as loaded from JSON
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ShelfSpec {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_true")]
    pub reachable: bool,
    pub local_address: SlaveAddr,
    #[serde(default)]
    pub picmg: Option<PicmgProperties>,
    #[serde(default)]
    pub controllers: Vec<SimController>,
}

fn default_true() -> bool {
    true
}

fn default_identity() -> DeviceIdentity {
    DeviceIdentity {
        device_id: 0x12,
        revision: 0x01,
        device_sdrs: false,
    }
}

/// One recorded protocol exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShelfCall {
    Open,
    Ping,
    PicmgProperties,
    LocalAddress,
    DeviceIdentity(SlaveAddr),
    SdrRecords(SlaveAddr),
    SensorReading(SlaveAddr, u8),
}

impl ShelfCall {
    /// Bus address a bridged request went to, if any
    pub fn target(&self) -> Option<SlaveAddr> {
        match self {
            ShelfCall::DeviceIdentity(a) | ShelfCall::SdrRecords(a) => Some(*a),
            ShelfCall::SensorReading(a, _) => Some(*a),
            _ => None,
        }
    }
}

struct ShelfState {
    spec: ShelfSpec,
    controllers: BTreeMap<SlaveAddr, SimController>,
    session_open: bool,
    calls: Vec<ShelfCall>,
}

/// Cloneable handle; clones share the same shelf
#[derive(Clone)]
pub struct SimulatedShelf {
    inner: Arc<Mutex<ShelfState>>,
}

impl SimulatedShelf {
    pub fn new(spec: ShelfSpec) -> Self {
        let controllers = spec
            .controllers
            .iter()
            .map(|c| (c.address, c.clone()))
            .collect();
        SimulatedShelf {
            inner: Arc::new(Mutex::new(ShelfState {
                spec,
                controllers,
                session_open: false,
                calls: Vec::new(),
            })),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let spec: ShelfSpec = serde_json::from_str(json)
            .map_err(|e| anyhow!("Failed to parse shelf description: {}", e))?;
        Ok(Self::new(spec))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read shelf file {}: {}", path.display(), e))?;
        log::debug!("Loaded simulated shelf from {}", path.display());
        Self::from_json(&content)
    }

    fn state(&self) -> MutexGuard<'_, ShelfState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self) -> Vec<ShelfCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Replace a controller's descriptor table
    pub fn set_sdrs(&self, address: SlaveAddr, sdrs: Vec<SdrRecord>) {
        if let Some(controller) = self.state().controllers.get_mut(&address) {
            controller.sdrs = sdrs;
        }
    }

    pub fn set_reading(&self, address: SlaveAddr, sensor: u8, reading: SensorReading) {
        self.update_sensor(address, sensor, |s| s.reading = reading);
    }

    pub fn set_failure(&self, address: SlaveAddr, sensor: u8, fail: Option<SimFailure>) {
        self.update_sensor(address, sensor, |s| s.fail = fail);
    }

    pub fn set_responding(&self, address: SlaveAddr, responding: bool) {
        if let Some(controller) = self.state().controllers.get_mut(&address) {
            controller.responding = responding;
        }
    }

    fn update_sensor<F: FnOnce(&mut SimSensor)>(&self, address: SlaveAddr, sensor: u8, f: F) {
        let mut state = self.state();
        let Some(controller) = state.controllers.get_mut(&address) else {
            return;
        };
        match controller
            .readings
            .iter_mut()
            .find(|s| s.sensor == sensor && s.lun == 0)
        {
            Some(existing) => f(existing),
            None => {
                let mut new_sensor = SimSensor {
                    sensor,
                    lun: 0,
                    reading: SensorReading::default(),
                    fail: None,
                };
                f(&mut new_sensor);
                controller.readings.push(new_sensor);
            }
        }
    }
}

impl ShelfState {
    fn record(&mut self, call: ShelfCall) -> Result<(), TransportError> {
        let needs_session = !matches!(call, ShelfCall::Open);
        self.calls.push(call);
        if needs_session && !self.session_open {
            return Err(TransportError::NoSession);
        }
        Ok(())
    }

    fn responding(&self, target: SlaveAddr) -> Result<&SimController, TransportError> {
        self.controllers
            .get(&target)
            .filter(|c| c.responding)
            .ok_or(TransportError::NoResponse(target))
    }
}

impl Transport for SimulatedShelf {
    fn open(&mut self, params: &SessionParams) -> Result<(), TransportError> {
        let mut state = self.state();
        state.record(ShelfCall::Open)?;
        if !state.spec.reachable || params.host.is_empty() {
            return Err(TransportError::Unreachable(params.host.clone()));
        }
        if params.username != state.spec.username || params.password != state.spec.password {
            return Err(TransportError::Auth(format!(
                "invalid credentials for user '{}'",
                params.username
            )));
        }
        state.session_open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.state().session_open = false;
    }

    fn ping(&mut self) -> Result<(), TransportError> {
        let mut state = self.state();
        state.record(ShelfCall::Ping)?;
        if !state.spec.reachable {
            return Err(TransportError::Timeout);
        }
        Ok(())
    }

    fn picmg_properties(&mut self) -> Result<Option<PicmgProperties>, TransportError> {
        let mut state = self.state();
        state.record(ShelfCall::PicmgProperties)?;
        Ok(state.spec.picmg)
    }

    fn local_address(&mut self) -> Result<SlaveAddr, TransportError> {
        let mut state = self.state();
        state.record(ShelfCall::LocalAddress)?;
        Ok(state.spec.local_address)
    }

    fn device_identity(&mut self, target: SlaveAddr) -> Result<DeviceIdentity, TransportError> {
        let mut state = self.state();
        state.record(ShelfCall::DeviceIdentity(target))?;
        state.responding(target).map(|c| c.identity)
    }

    fn sdr_records(
        &mut self,
        target: SlaveAddr,
        _source: SdrSource,
    ) -> Result<Vec<SdrRecord>, TransportError> {
        let mut state = self.state();
        state.record(ShelfCall::SdrRecords(target))?;
        state.responding(target).map(|c| c.sdrs.clone())
    }

    fn sensor_reading(
        &mut self,
        target: SlaveAddr,
        lun: u8,
        sensor: u8,
    ) -> Result<SensorReading, TransportError> {
        let mut state = self.state();
        state.record(ShelfCall::SensorReading(target, sensor))?;
        let controller = state.responding(target)?;
        let sim_sensor = controller
            .readings
            .iter()
            .find(|s| s.sensor == sensor && s.lun == lun)
            // Completion code 0xCB: requested sensor not present
            .ok_or(TransportError::Completion(0xcb))?;
        match sim_sensor.fail {
            Some(SimFailure::Timeout) => Err(TransportError::Timeout),
            Some(SimFailure::NoResponse) => Err(TransportError::NoResponse(target)),
            Some(SimFailure::Completion(code)) => Err(TransportError::Completion(code)),
            None => Ok(sim_sensor.reading),
        }
    }
}
