//! Engineering unit labels for sensor unit codes

const UNIT_NAMES: [&str; 93] = [
    "unspecified", "degrees C", "degrees F", "degrees K", "Volts", "Amps", "Watts", "Joules",
    "Coulombs", "VA", "Nits", "lumen", "lux", "Candela", "kPa", "PSI", "Newton", "CFM", "RPM",
    "Hz", "microsecond", "millisecond", "second", "minute", "hour", "day", "week", "mil",
    "inches", "feet", "cu in", "cu feet", "mm", "cm", "m", "cu cm", "cu m", "liters",
    "fluid ounce", "radians", "steradians", "revolutions", "cycles", "gravities", "ounce",
    "pound", "ft-lb", "oz-in", "gauss", "gilberts", "henry", "millihenry", "farad",
    "microfarad", "ohms", "siemens", "mole", "becquerel", "PPM", "reserved", "Decibels", "DbA",
    "DbC", "gray", "sievert", "color temp deg K", "bit", "kilobit", "megabit", "gigabit",
    "byte", "kilobyte", "megabyte", "gigabyte", "word", "dword", "qword", "line", "hit", "miss",
    "retry", "reset", "overflow", "underrun", "collision", "packets", "messages", "characters",
    "error", "correctable error", "uncorrectable error", "fatal error", "grams",
];

const RATE_SUFFIXES: [&str; 7] = ["", " per us", " per ms", " per s", " per minute", " per hour", " per day"];

fn unit_name(code: u8) -> &'static str {
    UNIT_NAMES.get(code as usize).copied().unwrap_or("unknown")
}

/// Label for a sensor's units from unit byte 1, base and modifier unit codes
pub fn unit_label(unit1: u8, base: u8, modifier: u8) -> String {
    let mut label = if base == 0 {
        String::new()
    } else {
        unit_name(base).to_string()
    };

    match (unit1 >> 1) & 0x03 {
        1 => label = format!("{}/{}", label, unit_name(modifier)),
        2 => label = format!("{}*{}", label, unit_name(modifier)),
        _ => {}
    }

    if let Some(rate) = RATE_SUFFIXES.get(((unit1 >> 3) & 0x07) as usize) {
        label.push_str(rate);
    }

    if unit1 & 0x01 != 0 {
        label = format!("% {label}").trim_end().to_string();
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_units() {
        assert_eq!(unit_label(0, 1, 0), "degrees C");
        assert_eq!(unit_label(0, 18, 0), "RPM");
        assert_eq!(unit_label(0, 0, 0), "");
        assert_eq!(unit_label(0, 200, 0), "unknown");
    }

    #[test]
    fn test_modifier_rate_and_percentage() {
        // Watts * hour
        assert_eq!(unit_label(0x04, 6, 24), "Watts*hour");
        // Volts per second
        assert_eq!(unit_label(0x18, 4, 0), "Volts per s");
        assert_eq!(unit_label(0x01, 0, 0), "%");
    }
}
