pub mod sdr;
pub mod session;
pub mod simulated;

pub use sdr::{CompactSensorRecord, FullSensorRecord, SdrRecord, SensorReading};
pub use session::{
    DeviceIdentity, PicmgProperties, PrivilegeLevel, Protocol, SdrSource, SessionParams,
    Transport, TransportError,
};
pub use simulated::{ShelfCall, ShelfSpec, SimFailure, SimulatedShelf};
