use crate::interfaces::{SensorReading, TransportError};
use crate::sensors::records::record_functions;
use crate::sensors::{ReadingValue, RecordType, SensorId};

use super::{DeviceError, DeviceState};

/// Live read of one sensor for one record kind, run with the device lock held
pub(crate) type QueryFn = fn(&mut DeviceState, &SensorId) -> Result<ReadingValue, DeviceError>;

impl DeviceState {
    pub(super) fn ai_query(&mut self, sensor: &SensorId) -> Result<ReadingValue, DeviceError> {
        self.query(sensor, RecordType::Ai)
    }

    pub(super) fn mbbi_direct_query(
        &mut self,
        sensor: &SensorId,
    ) -> Result<ReadingValue, DeviceError> {
        self.query(sensor, RecordType::MbbiDirect)
    }

    pub(super) fn mbbi_query(&mut self, sensor: &SensorId) -> Result<ReadingValue, DeviceError> {
        self.query(sensor, RecordType::Mbbi)
    }

    fn query(
        &mut self,
        sensor: &SensorId,
        record_type: RecordType,
    ) -> Result<ReadingValue, DeviceError> {
        let functions = match self.sensors.get(sensor) {
            Some(desc) => record_functions(desc.kind, record_type),
            None => {
                log::warn!("Bound sensor {} has no descriptor", sensor);
                return Err(DeviceError::StaleBinding(*sensor));
            }
        };

        let reading = self.ipmi_query(sensor)?;
        // Re-read the descriptor; it is never mutated in place, only replaced
        let desc = self
            .sensors
            .get(sensor)
            .ok_or(DeviceError::StaleBinding(*sensor))?;
        (functions.convert)(desc, &reading).ok_or(DeviceError::NotAnalog(*sensor))
    }

    /// Bus round-trip for one Get Sensor Reading
    fn ipmi_query(&mut self, sensor: &SensorId) -> Result<SensorReading, DeviceError> {
        if !self.connected {
            return Err(DeviceError::NotConnected);
        }
        let reading = self
            .transport
            .sensor_reading(sensor.ipmb, sensor.lun, sensor.number)
            .map_err(|e| match e {
                TransportError::Timeout => DeviceError::BusTimeout(*sensor),
                source => DeviceError::Bus {
                    sensor: *sensor,
                    source,
                },
            })?;
        if !reading.is_available() {
            log::debug!(
                "Sensor {} reading unavailable (status 0x{:02x})",
                sensor,
                reading.status
            );
            return Err(DeviceError::ReadingUnavailable(*sensor));
        }
        Ok(reading)
    }
}
