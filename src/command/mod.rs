mod dump;
mod ping;
mod run;
mod scan;

pub use dump::dump;
pub use ping::ping;
pub use run::run;
pub use scan::scan;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use ipmigw::device::Device;
use ipmigw::gateway::config::{self, GatewayConfig};
use ipmigw::gateway::{LoggingHost, TransportConfig};
use ipmigw::helpers::backoff_retry;
use ipmigw::interfaces::{SimulatedShelf, Transport};

struct Gateway {
    config: GatewayConfig,
    device: Device,
    host: Arc<LoggingHost>,
}

fn open_transport(config: &GatewayConfig) -> Result<Box<dyn Transport>> {
    match &config.transport {
        TransportConfig::Simulated { shelf } => Ok(Box::new(SimulatedShelf::from_file(shelf)?)),
    }
}

fn open_gateway(config_path: &Path) -> Result<Gateway> {
    let config = config::from_file(config_path)
        .map_err(|e| anyhow!("Failed to load {}: {}", config_path.display(), e))?;
    let host = Arc::new(LoggingHost::new());
    let device = Device::with_queue_capacity(
        config.device_id,
        open_transport(&config)?,
        host.clone(),
        config.queue_capacity,
    )?;
    Ok(Gateway {
        config,
        device,
        host,
    })
}

impl Gateway {
    fn connect(&self) -> Result<()> {
        let c = &self.config.connection;
        if self.device.connect(
            &c.host,
            &c.username,
            &c.password,
            &c.protocol,
            c.privilege_level,
        ) {
            Ok(())
        } else {
            Err(anyhow!("Could not connect to {}", c.host))
        }
    }

    fn connect_with_retry(&self) -> Result<()> {
        backoff_retry(
            || self.connect().map_err(backoff::Error::transient),
            self.config.connect_retry_window(),
        )
        .map_err(|e| match e {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        })
    }
}
