//! Named commands and the field overrides they apply.
//!
//! The catalog maps a human-readable command name (`"get version id"`) to the
//! sparse set of header fields that command fixes. A request is described by
//! caller defaults ([`CommandFields`]) merged with those overrides; anything
//! the entry leaves out keeps the caller's value.

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::family::MessageType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Stable identifier for every command in the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandId {
    // ========== NCSI ==========
    /// Clear initial state (`clear initial state`)
    ClearInitialState,
    /// Select package (`select package`)
    SelectPackage,
    /// Deselect package (`deselect package`)
    DeselectPackage,
    /// Enable channel (`enable channel`)
    EnableChannel,
    /// Disable channel (`disable channel`)
    DisableChannel,
    /// Reset channel (`reset channel`)
    ResetChannel,
    /// Enable channel network TX (`enable channel network tx`)
    EnableChannelNetworkTx,
    /// Recorded as `disable channel network rx`; code 0x07 is network TX disable.
    DisableChannelNetworkRx,
    /// AEN enable (`aen enable`)
    AenEnable,
    /// Set link (`set link`)
    SetLink,
    /// Get link status (`get link status`)
    GetLinkStatus,
    /// Set VLAN filter (`set vlan filter`)
    SetVlanFilter,
    /// Enable VLAN (`enable vlan`)
    EnableVlan,
    /// Disable VLAN (`disable vlan`)
    DisableVlan,
    /// Set MAC address (`set mac address`)
    SetMacAddress,
    /// Enable broadcast filter (`enable broadcast filter`)
    EnableBroadcastFilter,
    /// Disable broadcast filter (`disable broadcast filter`)
    DisableBroadcastFilter,
    /// Enable global multicast filter (`enable global multicast filter`)
    EnableGlobalMulticastFilter,
    /// Disable global multicast filter (`disable global multicast filter`)
    DisableGlobalMulticastFilter,
    /// Set NC-SI flow control (`set ncsi flow control`)
    SetFlowControl,
    /// Get version ID (`get version id`)
    GetVersionId,
    /// Get capabilities (`get capabilities`)
    GetCapabilities,
    /// Get parameters (`get parameters`)
    GetParameters,
    /// Get controller packet statistics (`get controller packet statistics`)
    GetControllerPacketStatistics,
    /// Get NC-SI statistics (`get ncsi statistics`)
    GetNcsiStatistics,
    /// Get NC-SI pass-through statistics (`get ncsi pass-through statistics`)
    GetPassthroughStatistics,
    /// Get package status (`get package status`)
    GetPackageStatus,
    /// OEM command (`oem command`)
    OemCommand,
    /// PLDM request over NCSI (`pldm request`)
    PldmRequest,
    /// Get package UUID (`get package uuid`)
    GetPackageUuid,

    // ========== MCTP control ==========
    /// Get endpoint ID (`get endpoint id`)
    GetEndpointId,
    /// Get endpoint UUID (`get endpoint uuid`)
    GetEndpointUuid,
    /// Get MCTP version support (`get mctp version support`)
    GetMctpVersionSupport,
    /// Get message type support (`get message type support`)
    GetMessageTypeSupport,
    /// Get vendor defined message support (`get vendor message support`)
    GetVendorMessageSupport,

    // ========== PLDM base ==========
    /// Get terminus ID (`get tid`)
    GetTid,
    /// Get PLDM version (`get pldm version`)
    GetPldmVersion,
    /// Get PLDM types (`get pldm types`)
    GetPldmTypes,
    /// Get PLDM commands (`get pldm commands`)
    GetPldmCommands,
}

impl CommandId {
    /// Every built-in command.
    pub const ALL: [CommandId; 39] = [
        CommandId::ClearInitialState,
        CommandId::SelectPackage,
        CommandId::DeselectPackage,
        CommandId::EnableChannel,
        CommandId::DisableChannel,
        CommandId::ResetChannel,
        CommandId::EnableChannelNetworkTx,
        CommandId::DisableChannelNetworkRx,
        CommandId::AenEnable,
        CommandId::SetLink,
        CommandId::GetLinkStatus,
        CommandId::SetVlanFilter,
        CommandId::EnableVlan,
        CommandId::DisableVlan,
        CommandId::SetMacAddress,
        CommandId::EnableBroadcastFilter,
        CommandId::DisableBroadcastFilter,
        CommandId::EnableGlobalMulticastFilter,
        CommandId::DisableGlobalMulticastFilter,
        CommandId::SetFlowControl,
        CommandId::GetVersionId,
        CommandId::GetCapabilities,
        CommandId::GetParameters,
        CommandId::GetControllerPacketStatistics,
        CommandId::GetNcsiStatistics,
        CommandId::GetPassthroughStatistics,
        CommandId::GetPackageStatus,
        CommandId::OemCommand,
        CommandId::PldmRequest,
        CommandId::GetPackageUuid,
        CommandId::GetEndpointId,
        CommandId::GetEndpointUuid,
        CommandId::GetMctpVersionSupport,
        CommandId::GetMessageTypeSupport,
        CommandId::GetVendorMessageSupport,
        CommandId::GetTid,
        CommandId::GetPldmVersion,
        CommandId::GetPldmTypes,
        CommandId::GetPldmCommands,
    ];

    /// Get the catalog name for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandId::ClearInitialState => "clear initial state",
            CommandId::SelectPackage => "select package",
            CommandId::DeselectPackage => "deselect package",
            CommandId::EnableChannel => "enable channel",
            CommandId::DisableChannel => "disable channel",
            CommandId::ResetChannel => "reset channel",
            CommandId::EnableChannelNetworkTx => "enable channel network tx",
            CommandId::DisableChannelNetworkRx => "disable channel network rx",
            CommandId::AenEnable => "aen enable",
            CommandId::SetLink => "set link",
            CommandId::GetLinkStatus => "get link status",
            CommandId::SetVlanFilter => "set vlan filter",
            CommandId::EnableVlan => "enable vlan",
            CommandId::DisableVlan => "disable vlan",
            CommandId::SetMacAddress => "set mac address",
            CommandId::EnableBroadcastFilter => "enable broadcast filter",
            CommandId::DisableBroadcastFilter => "disable broadcast filter",
            CommandId::EnableGlobalMulticastFilter => "enable global multicast filter",
            CommandId::DisableGlobalMulticastFilter => "disable global multicast filter",
            CommandId::SetFlowControl => "set ncsi flow control",
            CommandId::GetVersionId => "get version id",
            CommandId::GetCapabilities => "get capabilities",
            CommandId::GetParameters => "get parameters",
            CommandId::GetControllerPacketStatistics => "get controller packet statistics",
            CommandId::GetNcsiStatistics => "get ncsi statistics",
            CommandId::GetPassthroughStatistics => "get ncsi pass-through statistics",
            CommandId::GetPackageStatus => "get package status",
            CommandId::OemCommand => "oem command",
            CommandId::PldmRequest => "pldm request",
            CommandId::GetPackageUuid => "get package uuid",
            CommandId::GetEndpointId => "get endpoint id",
            CommandId::GetEndpointUuid => "get endpoint uuid",
            CommandId::GetMctpVersionSupport => "get mctp version support",
            CommandId::GetMessageTypeSupport => "get message type support",
            CommandId::GetVendorMessageSupport => "get vendor message support",
            CommandId::GetTid => "get tid",
            CommandId::GetPldmVersion => "get pldm version",
            CommandId::GetPldmTypes => "get pldm types",
            CommandId::GetPldmCommands => "get pldm commands",
        }
    }

    /// Parse a command id from its catalog name.
    pub fn from_name(s: &str) -> Option<CommandId> {
        CommandId::ALL.iter().copied().find(|id| id.as_str() == s)
    }

    /// The message family this command is sent as.
    pub fn family(&self) -> MessageType {
        match self {
            CommandId::GetEndpointId
            | CommandId::GetEndpointUuid
            | CommandId::GetMctpVersionSupport
            | CommandId::GetMessageTypeSupport
            | CommandId::GetVendorMessageSupport => MessageType::Mctp,
            CommandId::GetTid
            | CommandId::GetPldmVersion
            | CommandId::GetPldmTypes
            | CommandId::GetPldmCommands => MessageType::Pldm,
            _ => MessageType::Ncsi,
        }
    }

    /// The built-in catalog entry for this command.
    fn entry(&self) -> CatalogEntry {
        let ncsi = |iid: u8, command: u8| CatalogEntry::new(MessageType::Ncsi, iid, command);
        let mctp = |iid: u8, command: u8| CatalogEntry::new(MessageType::Mctp, iid, command);
        let pldm = |iid: u8, command: u8| {
            CatalogEntry::new(MessageType::Pldm, iid, command).pldm_type(PLDM_TYPE_BASE)
        };

        match self {
            CommandId::ClearInitialState => ncsi(0x00, NCSI_CLEAR_INITIAL_STATE),
            CommandId::SelectPackage => ncsi(0x02, NCSI_SELECT_PACKAGE)
                .channel(NCSI_PACKAGE_CHANNEL)
                .payload_len(4),
            CommandId::DeselectPackage => {
                ncsi(0x03, NCSI_DESELECT_PACKAGE).channel(NCSI_PACKAGE_CHANNEL)
            }
            CommandId::EnableChannel => ncsi(0x04, NCSI_ENABLE_CHANNEL),
            CommandId::DisableChannel => ncsi(0x05, NCSI_DISABLE_CHANNEL).payload_len(4),
            CommandId::ResetChannel => ncsi(0x06, NCSI_RESET_CHANNEL).payload_len(4),
            CommandId::EnableChannelNetworkTx => ncsi(0x07, NCSI_ENABLE_CHANNEL_NETWORK_TX),
            CommandId::DisableChannelNetworkRx => ncsi(0x08, NCSI_DISABLE_CHANNEL_NETWORK_TX)
                .unverified("command 0x07 is Disable Channel Network TX; the rx name is kept as recorded"),
            CommandId::SetLink => ncsi(0x09, NCSI_SET_LINK).unverified(
                "channel id and the 8-byte link settings payload were never filled in",
            ),
            CommandId::GetLinkStatus => ncsi(0x0A, NCSI_GET_LINK_STATUS),
            CommandId::SetVlanFilter => ncsi(0x0B, NCSI_SET_VLAN_FILTER).payload_len(8),
            CommandId::AenEnable => ncsi(0x0C, NCSI_AEN_ENABLE).payload_len(8),
            CommandId::EnableVlan => ncsi(0x0D, NCSI_ENABLE_VLAN).payload_len(4),
            CommandId::DisableVlan => ncsi(0x0E, NCSI_DISABLE_VLAN),
            CommandId::SetMacAddress => ncsi(0x0F, NCSI_SET_MAC_ADDRESS).payload_len(8),
            CommandId::EnableBroadcastFilter => {
                ncsi(0x10, NCSI_ENABLE_BROADCAST_FILTER).payload_len(4)
            }
            CommandId::DisableBroadcastFilter => ncsi(0x11, NCSI_DISABLE_BROADCAST_FILTER),
            CommandId::EnableGlobalMulticastFilter => {
                ncsi(0x12, NCSI_ENABLE_GLOBAL_MULTICAST_FILTER).payload_len(4)
            }
            CommandId::DisableGlobalMulticastFilter => {
                ncsi(0x13, NCSI_DISABLE_GLOBAL_MULTICAST_FILTER)
            }
            CommandId::SetFlowControl => ncsi(0x14, NCSI_SET_FLOW_CONTROL)
                .channel(NCSI_PACKAGE_CHANNEL)
                .payload_len(4),
            CommandId::GetVersionId => ncsi(0x15, NCSI_GET_VERSION_ID),
            CommandId::GetCapabilities => ncsi(0x16, NCSI_GET_CAPABILITIES),
            CommandId::GetParameters => ncsi(0x17, NCSI_GET_PARAMETERS),
            CommandId::GetControllerPacketStatistics => {
                ncsi(0x18, NCSI_GET_CONTROLLER_PACKET_STATISTICS)
            }
            CommandId::GetNcsiStatistics => ncsi(0x19, NCSI_GET_NCSI_STATISTICS),
            CommandId::GetPassthroughStatistics => ncsi(0x1A, NCSI_GET_PASSTHROUGH_STATISTICS),
            CommandId::GetPackageStatus => {
                ncsi(0x1B, NCSI_GET_PACKAGE_STATUS).channel(NCSI_PACKAGE_CHANNEL)
            }
            CommandId::OemCommand => ncsi(0x1C, NCSI_OEM_COMMAND)
                .payload_len(4)
                .unverified("vendor data after the manufacturer id must be supplied by the caller"),
            CommandId::PldmRequest => ncsi(0x1D, NCSI_PLDM_REQUEST)
                .unverified("the PLDM message must be supplied by the caller as payload"),
            CommandId::GetPackageUuid => {
                ncsi(0x1E, NCSI_GET_PACKAGE_UUID).channel(NCSI_PACKAGE_CHANNEL)
            }

            CommandId::GetEndpointId => mctp(0x01, MCTP_GET_ENDPOINT_ID),
            CommandId::GetEndpointUuid => mctp(0x02, MCTP_GET_ENDPOINT_UUID),
            // 0xFF asks for the base specification version
            CommandId::GetMctpVersionSupport => {
                mctp(0x03, MCTP_GET_VERSION_SUPPORT).payload(vec![0xFF])
            }
            CommandId::GetMessageTypeSupport => mctp(0x04, MCTP_GET_MESSAGE_TYPE_SUPPORT),
            CommandId::GetVendorMessageSupport => {
                mctp(0x05, MCTP_GET_VENDOR_MESSAGE_SUPPORT).payload(vec![0x00])
            }

            CommandId::GetTid => pldm(0x06, PLDM_GET_TID),
            // transfer handle 0, GetFirstPart, PLDM type 0
            CommandId::GetPldmVersion => {
                pldm(0x07, PLDM_GET_PLDM_VERSION).payload(vec![0, 0, 0, 0, 0x01, PLDM_TYPE_BASE])
            }
            CommandId::GetPldmTypes => pldm(0x08, PLDM_GET_PLDM_TYPES),
            // PLDM type 0, version 1.0.0
            CommandId::GetPldmCommands => pldm(0x09, PLDM_GET_PLDM_COMMANDS)
                .payload(vec![PLDM_TYPE_BASE, 0xF1, 0xF0, 0xF0, 0x00]),
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommandId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandId::from_name(s).ok_or_else(|| CodecError::UnknownCommand(s.to_string()))
    }
}

/// Sparse field overrides applied by a catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOverrides {
    /// Instance id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<u8>,
    /// Command code (NCSI control packet type, MCTP or PLDM command).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_code: Option<u8>,
    /// NCSI channel id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<u8>,
    /// Payload length in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_len: Option<u16>,
    /// Raw payload bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<u8>>,
    /// PLDM type (PLDM family only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pldm_type: Option<u8>,
}

/// One named command in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Family the command is sent as.
    pub family: MessageType,
    /// Fields the command fixes.
    #[serde(flatten)]
    pub overrides: CommandOverrides,
    /// Whether the values have been checked against the protocol.
    #[serde(default = "default_verified")]
    pub verified: bool,
    /// Why an entry is not verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_verified() -> bool {
    true
}

impl CatalogEntry {
    /// Create a verified entry fixing instance id and command code.
    pub fn new(family: MessageType, instance_id: u8, command_code: u8) -> Self {
        CatalogEntry {
            family,
            overrides: CommandOverrides {
                instance_id: Some(instance_id),
                command_code: Some(command_code),
                ..Default::default()
            },
            verified: true,
            note: None,
        }
    }

    /// Fix the channel id.
    pub fn channel(mut self, channel_id: u8) -> Self {
        self.overrides.channel_id = Some(channel_id);
        self
    }

    /// Fix the payload length (zero-filled payload).
    pub fn payload_len(mut self, len: u16) -> Self {
        self.overrides.payload_len = Some(len);
        self
    }

    /// Fix the payload bytes.
    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.overrides.payload = Some(payload);
        self
    }

    /// Fix the PLDM type.
    pub fn pldm_type(mut self, pldm_type: u8) -> Self {
        self.overrides.pldm_type = Some(pldm_type);
        self
    }

    /// Mark the entry as not checked against the protocol.
    pub fn unverified(mut self, note: impl Into<String>) -> Self {
        self.verified = false;
        self.note = Some(note.into());
        self
    }
}

/// Caller-supplied values for every request field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandFields {
    /// Management controller id.
    pub mc_id: u8,
    /// NCSI header revision.
    pub header_rev: u8,
    /// Instance id.
    pub instance_id: u8,
    /// Command code.
    pub command_code: u8,
    /// NCSI channel id.
    pub channel_id: u8,
    /// Payload length in bytes.
    pub payload_len: u16,
    /// Raw payload bytes (zero-filled to `payload_len` when absent).
    pub payload: Option<Vec<u8>>,
    /// PLDM type.
    pub pldm_type: u8,
}

impl CommandFields {
    /// Merge catalog overrides into these defaults.
    ///
    /// Every field present in `overrides` wins. A payload given without a
    /// length sets the length; a payload whose size disagrees with the final
    /// length is rejected.
    pub fn with_overrides(&self, overrides: &CommandOverrides) -> CodecResult<CommandFields> {
        let payload = overrides.payload.clone().or_else(|| self.payload.clone());
        let payload_len = match (overrides.payload_len, &overrides.payload) {
            (Some(len), _) => len,
            (None, Some(bytes)) => payload_length_of(bytes)?,
            (None, None) => self.payload_len,
        };

        let merged = CommandFields {
            mc_id: self.mc_id,
            header_rev: self.header_rev,
            instance_id: overrides.instance_id.unwrap_or(self.instance_id),
            command_code: overrides.command_code.unwrap_or(self.command_code),
            channel_id: overrides.channel_id.unwrap_or(self.channel_id),
            payload_len,
            payload,
            pldm_type: overrides.pldm_type.unwrap_or(self.pldm_type),
        };
        merged.check_payload()?;
        Ok(merged)
    }

    /// Check that an explicit payload matches the payload length.
    pub fn check_payload(&self) -> CodecResult<()> {
        if let Some(ref bytes) = self.payload {
            if bytes.len() != self.payload_len as usize {
                return Err(CodecError::validation(
                    "payload",
                    format!(
                        "{} bytes supplied but payload length is {}",
                        bytes.len(),
                        self.payload_len
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn payload_length_of(bytes: &[u8]) -> CodecResult<u16> {
    u16::try_from(bytes.len())
        .map_err(|_| CodecError::validation("payload", format!("{} bytes is too long", bytes.len())))
}

/// A fully resolved request: name, family and merged fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    /// Catalog name, if the request came from the catalog.
    pub name: Option<String>,
    /// Message family.
    pub family: MessageType,
    /// Merged field values.
    pub fields: CommandFields,
}

impl CommandDefinition {
    /// A request built directly from caller fields, bypassing the catalog.
    pub fn custom(family: MessageType, fields: CommandFields) -> CodecResult<Self> {
        fields.check_payload()?;
        Ok(CommandDefinition {
            name: None,
            family,
            fields,
        })
    }
}

/// Immutable table of named commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl CommandCatalog {
    /// The built-in NCSI / MCTP / PLDM catalog, built on first use.
    pub fn builtin() -> &'static CommandCatalog {
        static CATALOG: OnceLock<CommandCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| CommandCatalog {
            entries: CommandId::ALL
                .iter()
                .map(|id| (id.as_str().to_string(), id.entry()))
                .collect(),
        })
    }

    /// Build a catalog from named entries. Duplicate names are rejected.
    pub fn from_entries<I, S>(entries: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = (S, CatalogEntry)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, entry) in entries {
            let name = name.into();
            if map.contains_key(&name) {
                return Err(CodecError::validation(
                    "catalog",
                    format!("duplicate command '{}'", name),
                ));
            }
            map.insert(name, entry);
        }
        Ok(CommandCatalog { entries: map })
    }

    /// Look up the entry for a command name.
    pub fn entry(&self, name: &str) -> CodecResult<&CatalogEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| CodecError::UnknownCommand(name.to_string()))
    }

    /// Look up the overrides for a command name.
    pub fn resolve(&self, name: &str) -> CodecResult<&CommandOverrides> {
        self.entry(name).map(|entry| &entry.overrides)
    }

    /// Resolve a command and merge it into caller defaults.
    pub fn definition(&self, name: &str, defaults: &CommandFields) -> CodecResult<CommandDefinition> {
        let entry = self.entry(name)?;
        if !entry.verified {
            warn!(
                command = name,
                note = entry.note.as_deref().unwrap_or(""),
                "catalog entry is unverified"
            );
        }
        Ok(CommandDefinition {
            name: Some(name.to_string()),
            family: entry.family,
            fields: defaults.with_overrides(&entry.overrides)?,
        })
    }

    /// Merge the entry for a stable command id over `defaults`.
    pub fn definition_for(
        &self,
        id: CommandId,
        defaults: &CommandFields,
    ) -> CodecResult<CommandDefinition> {
        self.definition(id.as_str(), defaults)
    }

    /// Iterate entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Iterate the names of entries in one family.
    pub fn names_in(&self, family: MessageType) -> impl Iterator<Item = &str> {
        self.entries()
            .filter(move |(_, entry)| entry.family == family)
            .map(|(name, _)| name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_command_names_round_trip() {
        for id in CommandId::ALL {
            assert_eq!(id.as_str().parse::<CommandId>().unwrap(), id);
        }
    }

    #[test]
    fn test_resolve_recorded_entries() {
        let catalog = CommandCatalog::builtin();
        let select = catalog.resolve("select package").unwrap();
        assert_eq!(select.instance_id, Some(2));
        assert_eq!(select.command_code, Some(1));

        let status = catalog.resolve("get link status").unwrap();
        assert_eq!(status.instance_id, Some(0x0a));
        assert_eq!(status.command_code, Some(0x0a));
    }

    #[test]
    fn test_resolve_unknown_command() {
        let err = CommandCatalog::builtin()
            .resolve("nonexistent command")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert_eq!(err, CodecError::UnknownCommand("nonexistent command".into()));
    }

    #[test]
    fn test_definition_for_id_matches_name() {
        let catalog = CommandCatalog::builtin();
        let defaults = CommandFields::default();
        let by_id = catalog
            .definition_for(CommandId::GetLinkStatus, &defaults)
            .unwrap();
        let by_name = catalog.definition("get link status", &defaults).unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.family, MessageType::Ncsi);

        let tid = catalog.definition_for(CommandId::GetTid, &defaults).unwrap();
        assert_eq!(tid.family, CommandId::GetTid.family());
    }

    #[test]
    fn test_unverified_entries_are_flagged() {
        let catalog = CommandCatalog::builtin();
        assert!(!catalog.entry("set link").unwrap().verified);
        assert!(!catalog.entry("disable channel network rx").unwrap().verified);
        assert!(catalog.entry("get version id").unwrap().verified);
    }

    #[test]
    fn test_overrides_win_and_absent_fields_keep_defaults() {
        let defaults = CommandFields {
            mc_id: 3,
            header_rev: 1,
            instance_id: 99,
            command_code: 99,
            channel_id: 7,
            ..Default::default()
        };
        let def = CommandCatalog::builtin()
            .definition("select package", &defaults)
            .unwrap();
        assert_eq!(def.family, MessageType::Ncsi);
        assert_eq!(def.fields.mc_id, 3);
        assert_eq!(def.fields.header_rev, 1);
        assert_eq!(def.fields.instance_id, 2);
        assert_eq!(def.fields.command_code, 1);
        assert_eq!(def.fields.channel_id, NCSI_PACKAGE_CHANNEL);
        assert_eq!(def.fields.payload_len, 4);

        let def = CommandCatalog::builtin()
            .definition("enable channel", &defaults)
            .unwrap();
        assert_eq!(def.fields.channel_id, 7);
    }

    #[test]
    fn test_payload_sets_length() {
        let def = CommandCatalog::builtin()
            .definition("get pldm commands", &CommandFields::default())
            .unwrap();
        assert_eq!(def.family, MessageType::Pldm);
        assert_eq!(def.fields.payload_len, 5);
        assert_eq!(def.fields.pldm_type, PLDM_TYPE_BASE);
    }

    #[test]
    fn test_payload_length_mismatch() {
        let fields = CommandFields {
            payload_len: 4,
            payload: Some(vec![1, 2]),
            ..Default::default()
        };
        let err = CommandDefinition::custom(MessageType::Ncsi, fields).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let entry = CatalogEntry::new(MessageType::Ncsi, 1, 1);
        let result = CommandCatalog::from_entries(vec![("a", entry.clone()), ("a", entry)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_names_in_family() {
        let catalog = CommandCatalog::builtin();
        let pldm: Vec<&str> = catalog.names_in(MessageType::Pldm).collect();
        assert_eq!(
            pldm,
            vec!["get pldm commands", "get pldm types", "get pldm version", "get tid"]
        );
        assert_eq!(catalog.len(), CommandId::ALL.len());
    }
}
