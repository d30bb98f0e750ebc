use anyhow::{anyhow, Result};

use crate::argsets::ConfigArgs;

pub fn scan(args: ConfigArgs) -> Result<()> {
    let gw = super::open_gateway(&args.config)?;
    gw.connect()?;
    gw.device
        .detect_sensors()
        .map_err(|e| anyhow!("Scan failed: {}", e))?;

    for desc in gw.device.sensor_descriptors() {
        let unit = if desc.unit.is_empty() {
            String::new()
        } else {
            format!(" [{}]", desc.unit)
        };
        println!(
            "{}\t{:?}\ttype 0x{:02x}/0x{:02x}\t{}{}",
            desc.id, desc.kind, desc.sensor_type, desc.event_type, desc.name, unit
        );
    }
    Ok(())
}
