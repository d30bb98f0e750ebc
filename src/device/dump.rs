use serde::Serialize;

use crate::helpers::now_iso;
use crate::interfaces::{DeviceIdentity, PicmgProperties};
use crate::sensors::{PointEntry, PointId, SensorDescriptor, SlaveAddr};

use super::{DeviceState, DumpError, PointHost};

#[derive(Serialize)]
struct DatabaseDump<'a> {
    device: i16,
    generated_at: String,
    connected: bool,
    local_address: SlaveAddr,
    picmg: Option<PicmgProperties>,
    ipmbs: Vec<IpmbDump<'a>>,
    active_ipmbs: Vec<SlaveAddr>,
    sensors: Vec<&'a SensorDescriptor>,
    points: Vec<PointDump<'a>>,
}

#[derive(Serialize)]
struct IpmbDump<'a> {
    address: SlaveAddr,
    #[serde(flatten)]
    identity: &'a DeviceIdentity,
}

#[derive(Serialize)]
struct PointDump<'a> {
    id: PointId,
    #[serde(flatten)]
    entry: &'a PointEntry,
}

impl DeviceState {
    /// Refresh the whole topology and render it as pretty JSON
    pub(super) fn dump(&mut self, device: i16, host: &dyn PointHost) -> Result<Vec<u8>, DumpError> {
        if self.connected {
            if let Err(e) = self.detect_sensors(host) {
                log::warn!("Device {}: scan before dump failed: {}", device, e);
            }
        } else {
            log::warn!("Device {}: not connected, dumping cached state", device);
        }

        let dump = DatabaseDump {
            device,
            generated_at: now_iso(),
            connected: self.connected,
            local_address: self.local_addr,
            picmg: self.picmg,
            ipmbs: self
                .slaves
                .iter()
                .map(|(address, identity)| IpmbDump {
                    address: *address,
                    identity,
                })
                .collect(),
            active_ipmbs: self.bindings.active_ipmbs().iter().copied().collect(),
            sensors: self.sensors.iter().collect(),
            points: self
                .bindings
                .iter()
                .map(|(id, entry)| PointDump { id, entry })
                .collect(),
        };
        serde_json::to_vec_pretty(&dump).map_err(|e| {
            log::error!("Device {}: could not serialize dump: {}", device, e);
            DumpError::Json(e)
        })
    }
}
