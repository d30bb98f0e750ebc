//! Transport/session boundary
//!
//! The management protocol itself (RMCP/RMCP+ framing, authentication, IPMB
//! bridging) is supplied by a transport implementation. The device only talks to
//! it through the [`Transport`] trait and the record types in [`super::sdr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sdr::{SdrRecord, SensorReading};
use crate::sensors::models::SlaveAddr;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("controller unreachable: {0}")]
    Unreachable(String),
    #[error("no session open")]
    NoSession,
    #[error("request timed out")]
    Timeout,
    #[error("no response from {0}")]
    NoResponse(SlaveAddr),
    #[error("completion code 0x{0:02x}")]
    Completion(u8),
    #[error("unsupported protocol '{0}'")]
    Protocol(String),
}

/// RMCP flavour used for the LAN session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Lan,
    LanPlus,
}

impl FromStr for Protocol {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lan" => Ok(Protocol::Lan),
            "lanplus" => Ok(Protocol::LanPlus),
            other => Err(TransportError::Protocol(other.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Lan => write!(f, "lan"),
            Protocol::LanPlus => write!(f, "lanplus"),
        }
    }
}

/// Requested session privilege, numbered as on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrivilegeLevel {
    Callback = 1,
    User = 2,
    Operator = 3,
    Administrator = 4,
    Oem = 5,
}

impl TryFrom<i32> for PrivilegeLevel {
    type Error = i32;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(PrivilegeLevel::Callback),
            2 => Ok(PrivilegeLevel::User),
            3 => Ok(PrivilegeLevel::Operator),
            4 => Ok(PrivilegeLevel::Administrator),
            5 => Ok(PrivilegeLevel::Oem),
            other => Err(other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionParams {
    pub host: String,
    pub username: String,
    pub password: String,
    pub protocol: Protocol,
    pub privilege: PrivilegeLevel,
}

/// Reply to a PICMG "Get PICMG Properties" request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicmgProperties {
    /// Extension version, major in the low nibble (0x22 = PICMG 3.0 rev 2.2)
    pub version: u8,
    pub max_fru_id: u8,
    pub ipmc_fru_id: u8,
}

/// Subset of a "Get Device ID" reply that discovery cares about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_id: u8,
    pub revision: u8,
    /// Controller keeps its own device SDRs instead of using the repository
    #[serde(default)]
    pub device_sdrs: bool,
}

/// Which descriptor table to walk on a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdrSource {
    /// The shelf/BMC SDR repository
    Repository,
    /// Device SDRs held by the controller itself
    Device,
}

/// A session-oriented IPMI transport.
///
/// Implementations are not required to be usable from several threads at once;
/// the device serializes every call behind its state lock.
pub trait Transport: Send {
    fn open(&mut self, params: &SessionParams) -> Result<(), TransportError>;

    fn close(&mut self);

    /// Lightweight liveness check against the controller the session is open to
    fn ping(&mut self) -> Result<(), TransportError>;

    /// `Ok(None)` when the controller does not implement the PICMG extension
    fn picmg_properties(&mut self) -> Result<Option<PicmgProperties>, TransportError>;

    /// IPMB-0 address of the controller the session terminates at
    fn local_address(&mut self) -> Result<SlaveAddr, TransportError>;

    /// Bridged "Get Device ID"; fails with `NoResponse` for unpopulated addresses
    fn device_identity(&mut self, target: SlaveAddr) -> Result<DeviceIdentity, TransportError>;

    fn sdr_records(
        &mut self,
        target: SlaveAddr,
        source: SdrSource,
    ) -> Result<Vec<SdrRecord>, TransportError>;

    fn sensor_reading(
        &mut self,
        target: SlaveAddr,
        lun: u8,
        sensor: u8,
    ) -> Result<SensorReading, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_from_str() {
        assert_eq!("lanplus".parse::<Protocol>(), Ok(Protocol::LanPlus));
        assert_eq!("LAN".parse::<Protocol>(), Ok(Protocol::Lan));
        assert!("serial".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_privilege_level_from_int() {
        assert_eq!(PrivilegeLevel::try_from(4), Ok(PrivilegeLevel::Administrator));
        assert_eq!(PrivilegeLevel::try_from(2), Ok(PrivilegeLevel::User));
        assert_eq!(PrivilegeLevel::try_from(9), Err(9));
    }
}
