//! Raw-to-engineering conversion of full sensor readings
//!
//! `y = L[(M * x + B * 10^Bexp) * 10^Rexp]`, with `x` interpreted according to
//! the record's analog data format and `L` its linearization function.

use serde::{Deserialize, Serialize};

use crate::interfaces::sdr::FullSensorRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalogFormat {
    Unsigned,
    OnesComplement,
    TwosComplement,
    /// Sensor returns no analog reading
    NonAnalog,
}

impl AnalogFormat {
    /// From bits 7..6 of sensor unit byte 1
    pub fn from_unit1(unit1: u8) -> Self {
        match unit1 >> 6 {
            0 => AnalogFormat::Unsigned,
            1 => AnalogFormat::OnesComplement,
            2 => AnalogFormat::TwosComplement,
            _ => AnalogFormat::NonAnalog,
        }
    }

    fn interpret(self, raw: u8) -> Option<f64> {
        match self {
            AnalogFormat::Unsigned => Some(raw as f64),
            AnalogFormat::OnesComplement if raw & 0x80 != 0 => Some(-((!raw) as f64)),
            AnalogFormat::OnesComplement => Some(raw as f64),
            AnalogFormat::TwosComplement => Some(raw as i8 as f64),
            AnalogFormat::NonAnalog => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Linearization {
    Linear,
    Ln,
    Log10,
    Log2,
    E,
    Exp10,
    Exp2,
    OneOverX,
    Sqr,
    Cube,
    Sqrt,
    CubeRoot,
    /// Non-linear or reserved code; reading factors are not fetched per reading,
    /// so these are converted with the linear formula
    NonLinear(u8),
}

impl From<u8> for Linearization {
    fn from(code: u8) -> Self {
        match code & 0x7f {
            0x00 => Linearization::Linear,
            0x01 => Linearization::Ln,
            0x02 => Linearization::Log10,
            0x03 => Linearization::Log2,
            0x04 => Linearization::E,
            0x05 => Linearization::Exp10,
            0x06 => Linearization::Exp2,
            0x07 => Linearization::OneOverX,
            0x08 => Linearization::Sqr,
            0x09 => Linearization::Cube,
            0x0a => Linearization::Sqrt,
            0x0b => Linearization::CubeRoot,
            other => Linearization::NonLinear(other),
        }
    }
}

impl Linearization {
    fn apply(self, y: f64) -> f64 {
        match self {
            Linearization::Linear | Linearization::NonLinear(_) => y,
            Linearization::Ln => y.ln(),
            Linearization::Log10 => y.log10(),
            Linearization::Log2 => y.log2(),
            Linearization::E => y.exp(),
            Linearization::Exp10 => 10f64.powf(y),
            Linearization::Exp2 => y.exp2(),
            Linearization::OneOverX => 1.0 / y,
            Linearization::Sqr => y * y,
            Linearization::Cube => y * y * y,
            Linearization::Sqrt => y.sqrt(),
            Linearization::CubeRoot => y.cbrt(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Conversion {
    pub m: i16,
    pub b: i16,
    pub b_exp: i8,
    pub r_exp: i8,
    pub format: AnalogFormat,
    pub linearization: Linearization,
}

impl Conversion {
    /// Unpack the conversion factors of a full sensor record
    pub fn from_full_record(rec: &FullSensorRecord) -> Self {
        let m = (rec.m_lsb as u16) | (((rec.m_msb_tolerance & 0xc0) as u16) << 2);
        let b = (rec.b_lsb as u16) | (((rec.b_msb_accuracy & 0xc0) as u16) << 2);
        let linearization = Linearization::from(rec.linearization);
        if let Linearization::NonLinear(code) = linearization {
            log::debug!(
                "Sensor {} uses non-linear code 0x{:02x}; converting linearly",
                rec.sensor_number,
                code
            );
        }

        Conversion {
            m: sign_extend(m, 10),
            b: sign_extend(b, 10),
            b_exp: sign_extend((rec.r_b_exp & 0x0f) as u16, 4) as i8,
            r_exp: sign_extend((rec.r_b_exp >> 4) as u16, 4) as i8,
            format: AnalogFormat::from_unit1(rec.unit1),
            linearization,
        }
    }

    /// Convert a raw reading; `None` if the sensor has no analog reading or the
    /// linearization leaves the real numbers
    pub fn convert(&self, raw: u8) -> Option<f64> {
        let x = self.format.interpret(raw)?;
        let offset = scale_pow10(self.b as f64, self.b_exp as i32);
        let y = scale_pow10(self.m as f64 * x + offset, self.r_exp as i32);
        let y = self.linearization.apply(y);
        y.is_finite().then_some(y)
    }
}

/// Two's complement value of the low `bits` bits
fn sign_extend(value: u16, bits: u32) -> i16 {
    let shift = 16 - bits;
    ((value << shift) as i16) >> shift
}

/// Multiply by 10^exp, dividing for negative exponents to keep decimal scale
/// factors exact
fn scale_pow10(value: f64, exp: i32) -> f64 {
    if exp < 0 {
        value / 10f64.powi(-exp)
    } else {
        value * 10f64.powi(exp)
    }
}
