//! Discrete state labels per event/reading type

/// PICMG FRU hot-swap sensor type
pub const SENSOR_TYPE_HOT_SWAP: u8 = 0xf0;
const EVENT_TYPE_SENSOR_SPECIFIC: u8 = 0x6f;
/// Discrete sensors report at most 15 states
pub const MAX_STATES: usize = 15;

fn generic_states(event_type: u8) -> &'static [&'static str] {
    match event_type {
        0x02 => &["Transition to Idle", "Transition to Active", "Transition to Busy"],
        0x03 => &["State Deasserted", "State Asserted"],
        0x04 => &["Predictive Failure Deasserted", "Predictive Failure Asserted"],
        0x05 => &["Limit Not Exceeded", "Limit Exceeded"],
        0x06 => &["Performance Met", "Performance Lags"],
        0x07 => &[
            "OK",
            "Non-Critical from OK",
            "Critical from less severe",
            "Non-Recoverable from less severe",
            "Non-Critical from more severe",
            "Critical from Non-Recoverable",
            "Non-Recoverable",
            "Monitor",
            "Informational",
        ],
        0x08 => &["Device Absent", "Device Present"],
        0x09 => &["Device Disabled", "Device Enabled"],
        0x0a => &[
            "Running",
            "In Test",
            "Power Off",
            "On Line",
            "Off Line",
            "Off Duty",
            "Degraded",
            "Power Save",
            "Install Error",
        ],
        0x0b => &[
            "Fully Redundant",
            "Redundancy Lost",
            "Redundancy Degraded",
            "Non-redundant: Sufficient from Redundant",
            "Non-redundant: Sufficient from Insufficient",
            "Non-redundant: Insufficient",
            "Degraded from Fully Redundant",
            "Degraded from Non-redundant",
        ],
        0x0c => &["D0", "D1", "D2", "D3"],
        _ => &[],
    }
}

fn sensor_specific_states(sensor_type: u8) -> &'static [&'static str] {
    match sensor_type {
        SENSOR_TYPE_HOT_SWAP => &[
            "M0 Not Installed",
            "M1 Inactive",
            "M2 Activation Request",
            "M3 Activation In Progress",
            "M4 Active",
            "M5 Deactivation Request",
            "M6 Deactivation In Progress",
            "M7 Communication Lost",
        ],
        _ => &[],
    }
}

/// Labels of the states a discrete sensor can assert, by state offset
pub fn state_labels(event_type: u8, sensor_type: u8) -> Vec<String> {
    let named = if event_type == EVENT_TYPE_SENSOR_SPECIFIC {
        sensor_specific_states(sensor_type)
    } else {
        generic_states(event_type)
    };

    if named.is_empty() {
        (0..MAX_STATES).map(|n| format!("State {n}")).collect()
    } else {
        named.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_swap_states() {
        let labels = state_labels(0x6f, SENSOR_TYPE_HOT_SWAP);
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[4], "M4 Active");
    }

    #[test]
    fn test_generic_and_fallback_states() {
        assert_eq!(state_labels(0x08, 0x25), vec!["Device Absent", "Device Present"]);
        let fallback = state_labels(0x6f, 0x07);
        assert_eq!(fallback.len(), MAX_STATES);
        assert_eq!(fallback[14], "State 14");
    }
}
