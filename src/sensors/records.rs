//! Per record-kind functions
//!
//! Every pair of descriptor kind and point record type maps to a fill function
//! (one-shot projection of the descriptor onto point metadata) and a conversion
//! function (raw reading to typed value).

use serde::Serialize;

use super::conversion::Conversion;
use super::models::{RecordType, SdrKind, SensorDescriptor, SensorRange};
use super::states::{self, MAX_STATES};
use crate::interfaces::sdr::SensorReading;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AiMetadata {
    pub desc: String,
    pub egu: String,
    /// Display limits from the sensor's valid range
    pub lopr: Option<f64>,
    pub hopr: Option<f64>,
    /// Normal operating limits, when the sensor states both
    pub normal: Option<SensorRange>,
    pub prec: u8,
    pub conversion: Option<Conversion>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MbbiDirectMetadata {
    pub desc: String,
    pub bits: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MbbiState {
    /// Raw value the state corresponds to (its bit in the state mask)
    pub value: u16,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MbbiMetadata {
    pub desc: String,
    pub states: Vec<MbbiState>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "camelCase")]
pub enum PointMetadata {
    Ai(AiMetadata),
    MbbiDirect(MbbiDirectMetadata),
    Mbbi(MbbiMetadata),
}

/// Typed result of a sensor read
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingValue {
    /// Engineering value
    Analog(f64),
    /// Asserted states, one bit per state offset
    StateBits(u16),
    /// Asserted states and the lowest asserted state offset
    State { mask: u16, index: Option<u8> },
}

pub type FillFn = fn(&SensorDescriptor) -> PointMetadata;
pub type ConvertFn = fn(&SensorDescriptor, &SensorReading) -> Option<ReadingValue>;

#[derive(Clone, Copy)]
pub struct RecordFunctions {
    pub fill: FillFn,
    pub convert: ConvertFn,
}

pub fn record_functions(kind: SdrKind, record_type: RecordType) -> RecordFunctions {
    match (kind, record_type) {
        (SdrKind::Full, RecordType::Ai) => RecordFunctions {
            fill: fill_ai,
            convert: convert_ai_full,
        },
        // No conversion factors in a compact record
        (SdrKind::Compact, RecordType::Ai) => RecordFunctions {
            fill: fill_ai,
            convert: convert_ai_raw,
        },
        (_, RecordType::MbbiDirect) => RecordFunctions {
            fill: fill_mbbi_direct,
            convert: convert_state_bits,
        },
        (_, RecordType::Mbbi) => RecordFunctions {
            fill: fill_mbbi,
            convert: convert_state,
        },
    }
}

fn fill_ai(desc: &SensorDescriptor) -> PointMetadata {
    let prec = desc
        .conversion
        .map(|c| c.r_exp.min(0).unsigned_abs())
        .unwrap_or(0);
    PointMetadata::Ai(AiMetadata {
        desc: desc.name.clone(),
        egu: desc.unit.clone(),
        lopr: desc.range.map(|r| r.min),
        hopr: desc.range.map(|r| r.max),
        normal: desc.normal,
        prec,
        conversion: desc.conversion,
    })
}

fn fill_mbbi_direct(desc: &SensorDescriptor) -> PointMetadata {
    PointMetadata::MbbiDirect(MbbiDirectMetadata {
        desc: desc.name.clone(),
        bits: MAX_STATES as u8,
    })
}

fn fill_mbbi(desc: &SensorDescriptor) -> PointMetadata {
    let states = states::state_labels(desc.event_type, desc.sensor_type)
        .into_iter()
        .take(MAX_STATES)
        .enumerate()
        .map(|(offset, label)| MbbiState {
            value: 1 << offset,
            label,
        })
        .collect();
    PointMetadata::Mbbi(MbbiMetadata {
        desc: desc.name.clone(),
        states,
    })
}

fn convert_ai_full(desc: &SensorDescriptor, reading: &SensorReading) -> Option<ReadingValue> {
    desc.conversion?.convert(reading.reading).map(ReadingValue::Analog)
}

fn convert_ai_raw(_desc: &SensorDescriptor, reading: &SensorReading) -> Option<ReadingValue> {
    Some(ReadingValue::Analog(reading.reading as f64))
}

fn convert_state_bits(_desc: &SensorDescriptor, reading: &SensorReading) -> Option<ReadingValue> {
    Some(ReadingValue::StateBits(reading.state_mask()))
}

fn convert_state(_desc: &SensorDescriptor, reading: &SensorReading) -> Option<ReadingValue> {
    let mask = reading.state_mask();
    let index = (mask != 0).then(|| mask.trailing_zeros() as u8);
    Some(ReadingValue::State { mask, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::sdr::{CompactSensorRecord, FullSensorRecord};
    use crate::sensors::models::SlaveAddr;
    use crate::sensors::states::SENSOR_TYPE_HOT_SWAP;

    fn full_descriptor() -> SensorDescriptor {
        SensorDescriptor::from_full(
            SlaveAddr(0x20),
            &FullSensorRecord {
                sensor_number: 3,
                event_type: 0x01,
                unit_base: 4,
                m_lsb: 5,
                r_b_exp: 0xf0,
                sensor_max: 255,
                id_string: "12V".into(),
                ..Default::default()
            },
        )
    }

    fn hot_swap_descriptor() -> SensorDescriptor {
        SensorDescriptor::from_compact(
            SlaveAddr(0x82),
            &CompactSensorRecord {
                sensor_number: 0,
                sensor_type: SENSOR_TYPE_HOT_SWAP,
                event_type: 0x6f,
                id_string: "FRU0 HOT_SWAP".into(),
                ..Default::default()
            },
        )
    }

    fn reading(raw: u8, states: [u8; 2]) -> SensorReading {
        SensorReading {
            reading: raw,
            status: 0x40,
            states,
        }
    }

    #[test]
    fn test_fill_matches_record_type() {
        for desc in [full_descriptor(), hot_swap_descriptor()] {
            for record_type in RecordType::ALL {
                let meta = (record_functions(desc.kind, record_type).fill)(&desc);
                let filled = match meta {
                    PointMetadata::Ai(_) => RecordType::Ai,
                    PointMetadata::MbbiDirect(_) => RecordType::MbbiDirect,
                    PointMetadata::Mbbi(_) => RecordType::Mbbi,
                };
                assert_eq!(filled, record_type, "fill for {:?}/{}", desc.kind, record_type);
            }
        }
    }

    #[test]
    fn test_fill_ai_from_full() {
        let desc = full_descriptor();
        let f = record_functions(SdrKind::Full, RecordType::Ai);
        match (f.fill)(&desc) {
            PointMetadata::Ai(meta) => {
                assert_eq!(meta.desc, "12V");
                assert_eq!(meta.egu, "Volts");
                assert_eq!(meta.lopr, Some(0.0));
                assert_eq!(meta.hopr, Some(127.5));
                assert_eq!(meta.prec, 1);
                assert_eq!(meta.normal, None);
            }
            other => panic!("Expected ai metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_fill_ai_normal_range() {
        let desc = SensorDescriptor::from_full(
            SlaveAddr(0x20),
            &FullSensorRecord {
                sensor_number: 3,
                event_type: 0x01,
                m_lsb: 5,
                r_b_exp: 0xf0,
                analog_flags: 0x06,
                normal_min: 200,
                normal_max: 250,
                ..Default::default()
            },
        );
        match (record_functions(SdrKind::Full, RecordType::Ai).fill)(&desc) {
            PointMetadata::Ai(meta) => {
                assert_eq!(meta.normal, Some(SensorRange { min: 100.0, max: 125.0 }));
            }
            other => panic!("Expected ai metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_ai() {
        let f = record_functions(SdrKind::Full, RecordType::Ai);
        assert_eq!(
            (f.convert)(&full_descriptor(), &reading(10, [0, 0])),
            Some(ReadingValue::Analog(5.0))
        );

        let f = record_functions(SdrKind::Compact, RecordType::Ai);
        assert_eq!(
            (f.convert)(&hot_swap_descriptor(), &reading(10, [0, 0])),
            Some(ReadingValue::Analog(10.0))
        );
    }

    #[test]
    fn test_fill_mbbi_hot_swap_states() {
        let f = record_functions(SdrKind::Compact, RecordType::Mbbi);
        match (f.fill)(&hot_swap_descriptor()) {
            PointMetadata::Mbbi(meta) => {
                assert_eq!(meta.states.len(), 8);
                assert_eq!(meta.states[4].value, 0x10);
                assert_eq!(meta.states[4].label, "M4 Active");
            }
            other => panic!("Expected mbbi metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_states() {
        let desc = hot_swap_descriptor();
        let f = record_functions(SdrKind::Compact, RecordType::Mbbi);
        assert_eq!(
            (f.convert)(&desc, &reading(0, [0x10, 0x00])),
            Some(ReadingValue::State {
                mask: 0x10,
                index: Some(4)
            })
        );
        assert_eq!(
            (f.convert)(&desc, &reading(0, [0, 0])),
            Some(ReadingValue::State {
                mask: 0,
                index: None
            })
        );

        let f = record_functions(SdrKind::Compact, RecordType::MbbiDirect);
        assert_eq!(
            (f.convert)(&desc, &reading(0, [0x03, 0x01])),
            Some(ReadingValue::StateBits(0x0103))
        );
    }
}
