use thiserror::Error;

use crate::interfaces::TransportError;
use crate::sensors::{LinkError, PointId, RecordType, SensorId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("device is not connected")]
    NotConnected,
    #[error("invalid link for point {point}: {source}")]
    Link {
        point: PointId,
        #[source]
        source: LinkError,
    },
    #[error("point {0} is already registered")]
    DuplicatePoint(PointId),
    #[error("unknown point {0}")]
    UnknownPoint(PointId),
    #[error("point {point} is an {actual} record, not {expected}")]
    WrongRecordType {
        point: PointId,
        expected: RecordType,
        actual: RecordType,
    },
    #[error("point {0} is not bound to a sensor")]
    UnboundPoint(PointId),
    #[error("no descriptor for sensor {0}")]
    StaleBinding(SensorId),
    #[error("timed out reading sensor {0}")]
    BusTimeout(SensorId),
    #[error("bus error reading sensor {sensor}: {source}")]
    Bus {
        sensor: SensorId,
        #[source]
        source: TransportError,
    },
    #[error("reading of sensor {0} is unavailable")]
    ReadingUnavailable(SensorId),
    #[error("sensor {0} returned no analog value")]
    NotAnalog(SensorId),
    #[error("read queue is full")]
    QueueFull,
    #[error("read cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum DumpError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
