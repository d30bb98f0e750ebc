use std::time::Duration;

use crate::sensors::SlaveAddr;

pub const LOG_LEVEL: &str = "INFO";

/// IPMB-0 address of a BMC that does not report its own
pub const BMC_ADDRESS: SlaveAddr = SlaveAddr(0x20);

pub const QUEUE_CAPACITY: usize = 256;
pub const PROTOCOL: &str = "lanplus";
pub const PRIVILEGE_LEVEL: i32 = 2;

pub const READ_INTERVAL: Duration = Duration::from_secs(10);
pub const SCAN_INTERVAL: Duration = Duration::from_secs(300);
pub const CONNECT_RETRY_WINDOW: Duration = Duration::from_secs(120);
