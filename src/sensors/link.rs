//! Point link strings
//!
//! `[@]<address>[:<lun>] <sensor>` where either field may be `*`, or `any`
//! for both. Numbers are hex with a `0x` prefix or decimal. An address without
//! a LUN names LUN 0; a `*` address matches every LUN.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::models::{parse_byte, SensorId, SlaveAddr};

const WILDCARD: &str = "*";
const ANY: &str = "any";
const MAX_LUN: u8 = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("empty link")]
    Empty,
    #[error("expected '<address> <sensor>', got '{0}'")]
    Malformed(String),
    #[error("invalid bus address '{0}'")]
    Address(String),
    #[error("invalid LUN '{0}'")]
    Lun(String),
    #[error("invalid sensor number '{0}'")]
    Sensor(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PointLink {
    pub ipmb: Option<SlaveAddr>,
    pub lun: Option<u8>,
    pub sensor: Option<u8>,
}

impl PointLink {
    pub const ANY: PointLink = PointLink {
        ipmb: None,
        lun: None,
        sensor: None,
    };

    pub fn concrete(&self) -> Option<SensorId> {
        match (self.ipmb, self.sensor) {
            (Some(ipmb), Some(number)) => Some(SensorId {
                ipmb,
                lun: self.lun.unwrap_or(0),
                number,
            }),
            _ => None,
        }
    }

    pub fn matches(&self, id: &SensorId) -> bool {
        self.ipmb.map_or(true, |a| a == id.ipmb)
            && self.lun.map_or(true, |l| l == id.lun)
            && self.sensor.map_or(true, |n| n == id.number)
    }
}

impl From<SensorId> for PointLink {
    fn from(id: SensorId) -> Self {
        PointLink {
            ipmb: Some(id.ipmb),
            lun: Some(id.lun),
            sensor: Some(id.number),
        }
    }
}

fn parse_address(field: &str) -> Result<(Option<SlaveAddr>, Option<u8>), LinkError> {
    if field == WILDCARD {
        return Ok((None, None));
    }
    let (addr, lun) = match field.split_once(':') {
        Some((addr, lun)) => (addr, Some(lun)),
        None => (field, None),
    };
    let ipmb = parse_byte(addr).ok_or_else(|| LinkError::Address(field.to_string()))?;
    let lun = match lun {
        Some(l) => parse_byte(l)
            .filter(|l| *l <= MAX_LUN)
            .ok_or_else(|| LinkError::Lun(l.to_string()))?,
        None => 0,
    };
    Ok((Some(SlaveAddr(ipmb)), Some(lun)))
}

impl FromStr for PointLink {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('@').unwrap_or(s);
        let fields: Vec<&str> = s.split_whitespace().collect();
        match fields.as_slice() {
            [] => Err(LinkError::Empty),
            [word] if word.eq_ignore_ascii_case(ANY) => Ok(PointLink::ANY),
            [addr, sensor] => {
                let (ipmb, lun) = parse_address(addr)?;
                let sensor = match *sensor {
                    WILDCARD => None,
                    n => Some(parse_byte(n).ok_or_else(|| LinkError::Sensor(n.to_string()))?),
                };
                Ok(PointLink { ipmb, lun, sensor })
            }
            _ => Err(LinkError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for PointLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ipmb, self.lun) {
            (Some(a), Some(l)) if l != 0 => write!(f, "{a}:{l}")?,
            (Some(a), _) => write!(f, "{a}")?,
            (None, _) => write!(f, "{WILDCARD}")?,
        }
        match self.sensor {
            Some(n) => write!(f, " {n}"),
            None => write!(f, " {WILDCARD}"),
        }
    }
}
