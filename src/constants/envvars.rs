pub const LOG_LEVEL: &str = "LOGGING_LEVEL";

/// Path of the gateway configuration when `--config` is not given
pub const CONFIG: &str = "IPMIGW_CONFIG";
pub const PASSWORD: &str = "IPMIGW_PASSWORD";
