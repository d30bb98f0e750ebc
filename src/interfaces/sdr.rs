//! Raw protocol records handed over by the transport
//!
//! Fields are kept as the bytes the protocol packs them in; the sensors module
//! does the unpacking.

use serde::{Deserialize, Serialize};

/// Event/reading type code of threshold-based sensors
pub const EVENT_TYPE_THRESHOLD: u8 = 0x01;

/// Full sensor record (SDR type 0x01)
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FullSensorRecord {
    pub owner_lun: u8,
    pub sensor_number: u8,
    pub entity_id: u8,
    pub entity_instance: u8,
    pub sensor_type: u8,
    pub event_type: u8,
    /// Bits 7..6 analog data format, bits 5..3 rate unit, bits 2..1 modifier unit
    pub unit1: u8,
    pub unit_base: u8,
    pub unit_modifier: u8,
    pub linearization: u8,
    pub m_lsb: u8,
    /// Bits 7..6 are M's two most significant bits, 5..0 tolerance
    pub m_msb_tolerance: u8,
    pub b_lsb: u8,
    /// Bits 7..6 are B's two most significant bits, 5..0 accuracy
    pub b_msb_accuracy: u8,
    /// High nibble R (result) exponent, low nibble B exponent
    pub r_b_exp: u8,
    /// Bit 0 nominal reading, bit 1 normal max, bit 2 normal min specified
    pub analog_flags: u8,
    pub nominal_reading: u8,
    pub normal_max: u8,
    pub normal_min: u8,
    pub sensor_max: u8,
    pub sensor_min: u8,
    pub id_string: String,
}

/// Compact sensor record (SDR type 0x02)
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompactSensorRecord {
    pub owner_lun: u8,
    pub sensor_number: u8,
    pub entity_id: u8,
    pub entity_instance: u8,
    pub sensor_type: u8,
    pub event_type: u8,
    pub unit1: u8,
    pub unit_base: u8,
    pub unit_modifier: u8,
    pub id_string: String,
}

/// One entry of a controller's descriptor table
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SdrRecord {
    Full(FullSensorRecord),
    Compact(CompactSensorRecord),
    /// FRU locators, MC locators, OEM records and the like
    Other { record_type: u8 },
}

/// Get Sensor Reading response, completion code stripped
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorReading {
    pub reading: u8,
    /// Bit 7 event messages disabled, bit 6 scanning enabled, bit 5 unavailable
    pub status: u8,
    /// States 0..7 and 8..14 (threshold comparison bits for threshold sensors)
    pub states: [u8; 2],
}

impl SensorReading {
    const SCANNING_ENABLED: u8 = 0x40;
    const UNAVAILABLE: u8 = 0x20;

    pub fn is_available(&self) -> bool {
        self.status & Self::SCANNING_ENABLED != 0 && self.status & Self::UNAVAILABLE == 0
    }

    pub fn state_mask(&self) -> u16 {
        u16::from_le_bytes(self.states) & 0x7fff
    }
}
