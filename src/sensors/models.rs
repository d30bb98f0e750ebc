use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::conversion::Conversion;
use super::units;
use crate::interfaces::sdr::{CompactSensorRecord, FullSensorRecord, EVENT_TYPE_THRESHOLD};

/// 8-bit IPMB slave address of a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "AddrRepr", into = "String")]
pub struct SlaveAddr(pub u8);

#[derive(Deserialize)]
#[serde(untagged)]
enum AddrRepr {
    Number(u8),
    Text(String),
}

impl TryFrom<AddrRepr> for SlaveAddr {
    type Error = String;

    fn try_from(repr: AddrRepr) -> Result<Self, Self::Error> {
        match repr {
            AddrRepr::Number(n) => Ok(SlaveAddr(n)),
            AddrRepr::Text(s) => s.parse(),
        }
    }
}

impl From<SlaveAddr> for String {
    fn from(addr: SlaveAddr) -> Self {
        addr.to_string()
    }
}

impl FromStr for SlaveAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_byte(s)
            .map(SlaveAddr)
            .ok_or_else(|| format!("invalid bus address '{s}'"))
    }
}

impl fmt::Display for SlaveAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Parse a byte given as `0x..` hex or decimal
pub(crate) fn parse_byte(s: &str) -> Option<u8> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// Sensor identity: owning controller, LUN and sensor number
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct SensorId {
    pub ipmb: SlaveAddr,
    pub lun: u8,
    pub number: u8,
}

impl SensorId {
    /// Sensor on LUN 0
    pub fn new(ipmb: u8, number: u8) -> Self {
        Self::with_lun(ipmb, 0, number)
    }

    pub fn with_lun(ipmb: u8, lun: u8, number: u8) -> Self {
        SensorId {
            ipmb: SlaveAddr(ipmb),
            lun,
            number,
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lun {
            0 => write!(f, "{}/{}", self.ipmb, self.number),
            lun => write!(f, "{}:{}/{}", self.ipmb, lun, self.number),
        }
    }
}

/// Kind of descriptor record a sensor was discovered from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SdrKind {
    Full,
    Compact,
}

/// Record kinds of the points the host framework defines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordType {
    Ai,
    MbbiDirect,
    Mbbi,
}

impl RecordType {
    pub const ALL: [RecordType; 3] = [RecordType::Ai, RecordType::MbbiDirect, RecordType::Mbbi];
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Ai => write!(f, "ai"),
            RecordType::MbbiDirect => write!(f, "mbbiDirect"),
            RecordType::Mbbi => write!(f, "mbbi"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct SensorRange {
    pub min: f64,
    pub max: f64,
}

/// Discovered static metadata of a sensor. Always replaced as a whole.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SensorDescriptor {
    pub id: SensorId,
    pub kind: SdrKind,
    pub name: String,
    pub entity_id: u8,
    pub entity_instance: u8,
    pub sensor_type: u8,
    pub event_type: u8,
    pub unit: String,
    pub conversion: Option<Conversion>,
    pub range: Option<SensorRange>,
    pub nominal: Option<f64>,
    /// Normal operating range, when the record specifies both ends
    pub normal: Option<SensorRange>,
}

impl SensorDescriptor {
    pub fn from_full(owner: SlaveAddr, rec: &FullSensorRecord) -> Self {
        const NOMINAL_SPECIFIED: u8 = 0x01;
        const NORMAL_MAX_SPECIFIED: u8 = 0x02;
        const NORMAL_MIN_SPECIFIED: u8 = 0x04;

        let conversion = Conversion::from_full_record(rec);
        let range = converted_range(&conversion, rec.sensor_min, rec.sensor_max);
        let nominal = if rec.analog_flags & NOMINAL_SPECIFIED != 0 {
            conversion.convert(rec.nominal_reading)
        } else {
            None
        };
        let normal_flags = NORMAL_MAX_SPECIFIED | NORMAL_MIN_SPECIFIED;
        let normal = if rec.analog_flags & normal_flags == normal_flags {
            converted_range(&conversion, rec.normal_min, rec.normal_max)
        } else {
            None
        };

        SensorDescriptor {
            id: SensorId {
                ipmb: owner,
                lun: rec.owner_lun & 0x03,
                number: rec.sensor_number,
            },
            kind: SdrKind::Full,
            name: rec.id_string.trim().to_string(),
            entity_id: rec.entity_id,
            entity_instance: rec.entity_instance,
            sensor_type: rec.sensor_type,
            event_type: rec.event_type,
            unit: units::unit_label(rec.unit1, rec.unit_base, rec.unit_modifier),
            conversion: Some(conversion),
            range,
            nominal,
            normal,
        }
    }

    pub fn from_compact(owner: SlaveAddr, rec: &CompactSensorRecord) -> Self {
        SensorDescriptor {
            id: SensorId {
                ipmb: owner,
                lun: rec.owner_lun & 0x03,
                number: rec.sensor_number,
            },
            kind: SdrKind::Compact,
            name: rec.id_string.trim().to_string(),
            entity_id: rec.entity_id,
            entity_instance: rec.entity_instance,
            sensor_type: rec.sensor_type,
            event_type: rec.event_type,
            unit: units::unit_label(rec.unit1, rec.unit_base, rec.unit_modifier),
            conversion: None,
            range: None,
            nominal: None,
            normal: None,
        }
    }

    pub fn is_threshold(&self) -> bool {
        self.event_type == EVENT_TYPE_THRESHOLD
    }

    /// Whether a wildcard link for `record_type` may pick this sensor
    pub fn suits(&self, record_type: RecordType) -> bool {
        match record_type {
            RecordType::Ai => self.kind == SdrKind::Full && self.is_threshold(),
            RecordType::MbbiDirect | RecordType::Mbbi => !self.is_threshold(),
        }
    }
}

/// Engineering range of two raw bounds; reversed when M is negative
fn converted_range(conversion: &Conversion, lo: u8, hi: u8) -> Option<SensorRange> {
    match (conversion.convert(lo), conversion.convert(hi)) {
        (Some(a), Some(b)) => Some(SensorRange {
            min: a.min(b),
            max: a.max(b),
        }),
        _ => None,
    }
}
