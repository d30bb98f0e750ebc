use crate::constants::defaults;
use crate::interfaces::{PrivilegeLevel, Protocol, SessionParams, TransportError};

use crate::sensors::DescriptorCache;

use super::DeviceState;

pub(super) fn session_params(
    host: &str,
    username: &str,
    password: &str,
    protocol: &str,
    privilege_level: i32,
) -> Result<SessionParams, TransportError> {
    let protocol: Protocol = protocol.parse()?;
    let privilege = PrivilegeLevel::try_from(privilege_level).map_err(|level| {
        TransportError::Protocol(format!("privilege level {} out of range 1..=5", level))
    })?;
    Ok(SessionParams {
        host: host.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        protocol,
        privilege,
    })
}

impl DeviceState {
    pub(super) fn connect(&mut self, params: &SessionParams) -> Result<(), TransportError> {
        self.disconnect();
        self.transport.open(params)?;
        self.connected = true;
        // New session, possibly a different shelf; bindings stay, descriptors
        // come back with the next full scan
        self.scanned = false;
        self.slaves.clear();
        self.sensors = DescriptorCache::new();
        self.check_picmg();
        self.find_ipmb();
        Ok(())
    }

    pub(super) fn disconnect(&mut self) {
        if self.connected {
            self.transport.close();
            self.connected = false;
        }
    }

    pub(super) fn ping(&mut self) -> bool {
        if !self.connected {
            return false;
        }
        match self.transport.ping() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Ping failed: {}", e);
                false
            }
        }
    }

    /// Detect whether the controller speaks the ATCA extension
    fn check_picmg(&mut self) {
        self.picmg = match self.transport.picmg_properties() {
            Ok(Some(props)) => {
                log::info!(
                    "PICMG extension {}.{} detected, {} FRUs",
                    props.version & 0x0f,
                    props.version >> 4,
                    props.max_fru_id as u16 + 1
                );
                Some(props)
            }
            Ok(None) => None,
            Err(e) => {
                log::debug!("No PICMG extension: {}", e);
                None
            }
        };
    }

    /// Learn our own IPMB-0 address; plain BMCs sit at the default one
    fn find_ipmb(&mut self) {
        self.local_addr = defaults::BMC_ADDRESS;
        if self.picmg.is_none() {
            return;
        }
        match self.transport.local_address() {
            Ok(addr) => self.local_addr = addr,
            Err(e) => log::warn!(
                "Could not determine local IPMB address, assuming {}: {}",
                defaults::BMC_ADDRESS,
                e
            ),
        }
        log::debug!("Local IPMB address is {}", self.local_addr);
    }
}
