use anyhow::{anyhow, Result};

use crate::argsets::DumpArgs;

pub fn dump(args: DumpArgs) -> Result<()> {
    let gw = super::open_gateway(&args.config)?;
    gw.connect()?;
    gw.device
        .dump_database(&args.file)
        .map_err(|e| anyhow!("Failed to dump to {}: {}", args.file.display(), e))?;
    println!("Wrote {}", args.file.display());
    Ok(())
}
