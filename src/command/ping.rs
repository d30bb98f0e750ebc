use anyhow::{anyhow, Result};

use crate::argsets::ConfigArgs;

pub fn ping(args: ConfigArgs) -> Result<()> {
    let gw = super::open_gateway(&args.config)?;
    gw.connect()?;
    if gw.device.ping() {
        println!("{} is alive", gw.config.connection.host);
        Ok(())
    } else {
        Err(anyhow!("{} did not answer", gw.config.connection.host))
    }
}
