//! Runner configuration.
//!
//! Loaded from YAML; every key is optional and falls back to the defaults
//! below. Command-line flags are applied on top through [`Overrides`].
//!
//! ```yaml
//! executor:
//!   mctp: mctp-utils
//!   bus: i2ctransfer
//! transport:
//!   bus: 1
//!   dst_eid: 0
//!   slave_addr: 55      # 0 omits -s
//!   decode_response: true
//! header:
//!   mc_id: 0
//!   header_rev: 1
//!   iid: 1
//!   command: 0
//!   channel: 0
//!   pay_len: 0
//! extract_mode: strict  # or lenient
//! marker: raw response
//! ```

use crate::error::{RunnerError, RunnerResult};
use serde::{Deserialize, Serialize};
use sideband_codec::{CommandFields, ExtractMode, PayloadLength, TransportArgs};
use std::path::Path;

/// Executor program names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// NCSI / MCTP / PLDM transport tool.
    pub mctp: String,
    /// SMBus transfer tool.
    pub bus: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            mctp: "mctp-utils".to_string(),
            bus: "i2ctransfer".to_string(),
        }
    }
}

/// Positional transport arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Bus number.
    pub bus: u8,
    /// Destination endpoint id.
    pub dst_eid: u8,
    /// Slave address passed with `-s`; 0 leaves the flag out.
    pub slave_addr: u8,
    /// Pass `-d` so the tool decodes its response.
    pub decode_response: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            bus: 1,
            dst_eid: 0,
            slave_addr: 55,
            decode_response: true,
        }
    }
}

/// Request header defaults merged under every catalog command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub mc_id: u8,
    pub header_rev: u8,
    pub iid: u8,
    pub command: u8,
    pub channel: u8,
    pub pay_len: u16,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        HeaderConfig {
            mc_id: 0,
            header_rev: 1,
            iid: 1,
            command: 0,
            channel: 0,
            pay_len: 0,
        }
    }
}

/// Full runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub executor: ExecutorConfig,
    pub transport: TransportConfig,
    pub header: HeaderConfig,
    /// How layouts treat positions past the payload.
    pub extract_mode: ExtractMode,
    /// Marker line preceding the raw response.
    pub marker: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            executor: ExecutorConfig::default(),
            transport: TransportConfig::default(),
            header: HeaderConfig::default(),
            extract_mode: ExtractMode::Strict,
            marker: sideband_codec::RAW_RESPONSE_MARKER.to_string(),
        }
    }
}

/// Command-line values that replace configured ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub bus: Option<u8>,
    pub dst_eid: Option<u8>,
    pub slave_addr: Option<u8>,
    pub mc_id: Option<u8>,
    pub header_rev: Option<u8>,
    pub no_decode: bool,
    pub lenient: bool,
}

impl RunnerConfig {
    /// Load configuration from a YAML file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> RunnerResult<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                Self::from_yaml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate YAML configuration text.
    pub fn from_yaml(text: &str) -> RunnerResult<Self> {
        let config: RunnerConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the codec would otherwise reject on every call.
    pub fn validate(&self) -> RunnerResult<()> {
        if self.executor.mctp.trim().is_empty() || self.executor.bus.trim().is_empty() {
            return Err(RunnerError::Config("executor program name is empty".into()));
        }
        if self.marker.is_empty() {
            return Err(RunnerError::Config("response marker is empty".into()));
        }
        PayloadLength::new(self.header.pay_len)?;
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(bus) = overrides.bus {
            self.transport.bus = bus;
        }
        if let Some(dst_eid) = overrides.dst_eid {
            self.transport.dst_eid = dst_eid;
        }
        if let Some(slave_addr) = overrides.slave_addr {
            self.transport.slave_addr = slave_addr;
        }
        if let Some(mc_id) = overrides.mc_id {
            self.header.mc_id = mc_id;
        }
        if let Some(header_rev) = overrides.header_rev {
            self.header.header_rev = header_rev;
        }
        if overrides.no_decode {
            self.transport.decode_response = false;
        }
        if overrides.lenient {
            self.extract_mode = ExtractMode::Lenient;
        }
    }

    /// Transport arguments for the NCSI/MCTP executor.
    pub fn transport_args(&self) -> TransportArgs {
        TransportArgs {
            decode_response: self.transport.decode_response,
            slave_addr: Some(self.transport.slave_addr).filter(|&a| a != 0),
            bus: self.transport.bus,
            dst_eid: self.transport.dst_eid,
        }
    }

    /// Caller defaults merged under catalog commands.
    pub fn defaults(&self) -> CommandFields {
        CommandFields {
            mc_id: self.header.mc_id,
            header_rev: self.header.header_rev,
            instance_id: self.header.iid,
            command_code: self.header.command,
            channel_id: self.header.channel,
            payload_len: self.header.pay_len,
            ..Default::default()
        }
    }
}
