#![allow(dead_code)]
// rust-analyzer flags some of these as unused depending on which test
// binary it looks at; hence the warning suppression

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

/// ATCA shelf: shelf manager at 0x20, two boards at 0x82 and 0x84
pub const PICMG_SHELF: &str = r#"
{
    "username": "admin",
    "password": "secret",
    "local_address": "0x20",
    "picmg": { "version": 34, "max_fru_id": 7, "ipmc_fru_id": 0 },
    "controllers": [
        {
            "address": "0x20",
            "identity": { "device_id": 1, "revision": 2 },
            "sdrs": [
                {
                    "kind": "full",
                    "sensor_number": 3,
                    "event_type": 1,
                    "unit_base": 4,
                    "m_lsb": 5,
                    "r_b_exp": 240,
                    "sensor_max": 255,
                    "id_string": "12V"
                },
                {
                    "kind": "full",
                    "sensor_number": 4,
                    "event_type": 1,
                    "unit_base": 1,
                    "m_lsb": 1,
                    "sensor_max": 127,
                    "id_string": "Shelf Temp"
                }
            ],
            "readings": [
                { "sensor": 3, "reading": 10, "status": 192 },
                { "sensor": 4, "reading": 42, "status": 192 }
            ]
        },
        {
            "address": "0x82",
            "identity": { "device_id": 18, "revision": 1, "device_sdrs": true },
            "sdrs": [
                {
                    "kind": "compact",
                    "sensor_number": 0,
                    "sensor_type": 240,
                    "event_type": 111,
                    "id_string": "FRU0 HOT_SWAP"
                },
                {
                    "kind": "full",
                    "sensor_number": 1,
                    "event_type": 1,
                    "unit_base": 1,
                    "m_lsb": 1,
                    "sensor_max": 127,
                    "id_string": "Board Temp"
                },
                { "kind": "other", "record_type": 18 }
            ],
            "readings": [
                { "sensor": 0, "status": 192, "states": [16, 0] },
                { "sensor": 1, "reading": 35, "status": 192 }
            ]
        },
        {
            "address": "0x84",
            "sdrs": [
                {
                    "kind": "full",
                    "sensor_number": 1,
                    "event_type": 1,
                    "unit_base": 1,
                    "m_lsb": 1,
                    "sensor_max": 127,
                    "id_string": "CPU Temp"
                }
            ],
            "readings": [
                { "sensor": 1, "reading": 61, "status": 192 }
            ]
        }
    ]
}
"#;

/// Plain server BMC without the PICMG extension
pub const BMC_ONLY: &str = r#"
{
    "username": "admin",
    "password": "secret",
    "local_address": "0x20",
    "controllers": [
        {
            "address": "0x20",
            "sdrs": [
                {
                    "kind": "full",
                    "sensor_number": 3,
                    "event_type": 1,
                    "unit_base": 4,
                    "m_lsb": 5,
                    "r_b_exp": 240,
                    "sensor_max": 255,
                    "id_string": "12V"
                }
            ],
            "readings": [
                { "sensor": 3, "reading": 10, "status": 192 }
            ]
        }
    ]
}
"#;

/// BMC exposing sensor number 3 on LUN 0 and on LUN 1
pub const TWO_LUN_BMC: &str = r#"
{
    "username": "admin",
    "password": "secret",
    "local_address": "0x20",
    "controllers": [
        {
            "address": "0x20",
            "sdrs": [
                {
                    "kind": "full",
                    "sensor_number": 3,
                    "event_type": 1,
                    "unit_base": 4,
                    "m_lsb": 5,
                    "r_b_exp": 240,
                    "sensor_max": 255,
                    "id_string": "12V"
                },
                {
                    "kind": "full",
                    "owner_lun": 1,
                    "sensor_number": 3,
                    "event_type": 1,
                    "unit_base": 1,
                    "m_lsb": 1,
                    "sensor_max": 127,
                    "id_string": "Inlet Temp"
                }
            ],
            "readings": [
                { "sensor": 3, "reading": 10, "status": 192 },
                { "sensor": 3, "lun": 1, "reading": 42, "status": 192 }
            ]
        }
    ]
}
"#;

/// Gateway configuration; `{shelf}` is replaced with the shelf file path
pub const GATEWAY_CONFIG: &str = r#"
{
    "device_id": 1,
    "connection": {
        "host": "shelf-1",
        "username": "admin",
        "password": "secret",
        "protocol": "lanplus",
        "privilege_level": 4
    },
    "transport": { "kind": "simulated", "shelf": "{shelf}" },
    "points": [
        { "id": 1, "record": "ai", "link": "@0x20 3" },
        { "id": 2, "record": "mbbi", "link": "0x82 *", "mode": "asynchronous" }
    ],
    "read_interval_secs": 1,
    "connect_retry_secs": 1
}
"#;

pub const BAD_GATEWAY_CONFIG: &str = r#"
{
    "connection": { "host": "shelf-1" },
    "transport": { "kind": "serial" }
}
"#;
