//! Declarative response payload layouts.
//!
//! A [`ResponseLayout`] names the fields of one command's response payload and
//! says where each lives. Positions are zero-based token indices into the
//! payload segment (everything after the response code and reason for NCSI,
//! everything after the completion code for MCTP and PLDM); ranges include
//! both ends.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Where a field lives in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldLayout {
    /// A single token.
    Offset(usize),
    /// Tokens `start..=end`, kept as a sequence.
    Range(usize, usize),
    /// Tokens `start..=end`, hex-decoded to text.
    StringRange(usize, usize),
}

impl FieldLayout {
    /// First token index.
    pub fn start(&self) -> usize {
        match *self {
            FieldLayout::Offset(i) => i,
            FieldLayout::Range(start, _) | FieldLayout::StringRange(start, _) => start,
        }
    }

    /// Last token index (inclusive).
    pub fn end(&self) -> usize {
        match *self {
            FieldLayout::Offset(i) => i,
            FieldLayout::Range(_, end) | FieldLayout::StringRange(_, end) => end,
        }
    }

    /// Reject ranges whose start lies past their end.
    pub fn validate(&self, field: &str) -> CodecResult<()> {
        if self.start() > self.end() {
            return Err(CodecError::validation(
                field,
                format!("range {}..={} is reversed", self.start(), self.end()),
            ));
        }
        Ok(())
    }
}

/// One named field of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutField {
    /// Output field name.
    pub name: String,
    /// Position in the payload.
    pub at: FieldLayout,
}

/// Ordered field layout of one command's response payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseLayout {
    fields: Vec<LayoutField>,
}

impl ResponseLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single-token field.
    pub fn offset(self, name: &str, index: usize) -> Self {
        self.field(name, FieldLayout::Offset(index))
    }

    /// Add a token-range field.
    pub fn range(self, name: &str, start: usize, end: usize) -> Self {
        self.field(name, FieldLayout::Range(start, end))
    }

    /// Add a text field.
    pub fn string(self, name: &str, start: usize, end: usize) -> Self {
        self.field(name, FieldLayout::StringRange(start, end))
    }

    /// Add a field.
    pub fn field(mut self, name: &str, at: FieldLayout) -> Self {
        self.fields.push(LayoutField {
            name: name.to_string(),
            at,
        });
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }

    /// Look up a field position by name.
    pub fn get(&self, name: &str) -> CodecResult<FieldLayout> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.at)
            .ok_or_else(|| CodecError::MissingField(name.to_string()))
    }

    /// Number of payload tokens needed to satisfy every field.
    pub fn min_payload_tokens(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.at.end().saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the layout has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Layouts keyed by command name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutTable {
    layouts: BTreeMap<String, ResponseLayout>,
}

impl LayoutTable {
    /// Build a table from named layouts.
    pub fn from_layouts<I, S>(layouts: I) -> Self
    where
        I: IntoIterator<Item = (S, ResponseLayout)>,
        S: Into<String>,
    {
        LayoutTable {
            layouts: layouts.into_iter().map(|(n, l)| (n.into(), l)).collect(),
        }
    }

    /// Built-in layouts for the NCSI, MCTP and PLDM catalog.
    pub fn builtin() -> &'static LayoutTable {
        static TABLE: OnceLock<LayoutTable> = OnceLock::new();
        TABLE.get_or_init(builtin_layouts)
    }

    /// The layout registered for a command, if any.
    pub fn get(&self, command: &str) -> Option<&ResponseLayout> {
        self.layouts.get(command)
    }

    /// The layout registered for a command, or a lookup error.
    pub fn layout(&self, command: &str) -> CodecResult<&ResponseLayout> {
        self.get(command)
            .ok_or_else(|| CodecError::UnknownCommand(command.to_string()))
    }

    /// Iterate layouts in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseLayout)> {
        self.layouts.iter().map(|(n, l)| (n.as_str(), l))
    }

    /// Number of layouts.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

fn builtin_layouts() -> LayoutTable {
    LayoutTable::from_layouts([
        // ========== NCSI ==========
        (
            "get link status",
            ResponseLayout::new()
                .range("linkStatus", 0, 3)
                .range("otherIndications", 4, 7)
                .range("oemLinkStatus", 8, 11),
        ),
        (
            "get version id",
            ResponseLayout::new()
                .range("ncsiVersion", 0, 7)
                .string("firmwareName", 8, 19)
                .range("firmwareVersion", 20, 23)
                .range("pciDeviceId", 24, 25)
                .range("pciVendorId", 26, 27)
                .range("pciSubsystemId", 28, 29)
                .range("pciSubsystemVendorId", 30, 31)
                .range("manufacturerId", 32, 35),
        ),
        (
            "get capabilities",
            ResponseLayout::new()
                .range("capabilitiesFlags", 0, 3)
                .range("broadcastPacketFilter", 4, 7)
                .range("multicastPacketFilter", 8, 11)
                .range("bufferingCapability", 12, 15)
                .range("aenControlSupport", 16, 19)
                .offset("vlanFilterCount", 20)
                .offset("mixedFilterCount", 21)
                .offset("multicastFilterCount", 22)
                .offset("unicastFilterCount", 23)
                .offset("vlanModeSupport", 26)
                .offset("channelCount", 27),
        ),
        (
            "get parameters",
            ResponseLayout::new()
                .offset("macAddressCount", 0)
                .offset("macAddressFlags", 3)
                .offset("vlanTagCount", 4)
                .range("vlanTagFlags", 6, 7)
                .range("linkSettings", 8, 11)
                .range("broadcastFilterSettings", 12, 15)
                .range("configurationFlags", 16, 19)
                .offset("vlanMode", 20)
                .offset("flowControlEnable", 21)
                .range("aenControl", 24, 27),
        ),
        (
            "get controller packet statistics",
            ResponseLayout::new()
                .range("countersClearedHigh", 0, 3)
                .range("countersClearedLow", 4, 7)
                .range("totalBytesReceived", 8, 15)
                .range("totalBytesTransmitted", 16, 23)
                .range("totalUnicastReceived", 24, 31)
                .range("totalMulticastReceived", 32, 39)
                .range("totalBroadcastReceived", 40, 47),
        ),
        (
            "get ncsi statistics",
            ResponseLayout::new()
                .range("commandsReceived", 0, 3)
                .range("controlPacketsDropped", 4, 7)
                .range("commandTypeErrors", 8, 11)
                .range("commandChecksumErrors", 12, 15)
                .range("receiveControlPackets", 16, 19)
                .range("transmitControlPackets", 20, 23)
                .range("aensSent", 24, 27),
        ),
        (
            "get ncsi pass-through statistics",
            ResponseLayout::new()
                .range("txPacketsReceived", 0, 7)
                .range("txPacketsDropped", 8, 11)
                .range("txChannelStateDropped", 12, 15)
                .range("txUndersizedErrors", 16, 19)
                .range("txOversizedErrors", 20, 23)
                .range("rxPacketsReceived", 24, 27)
                .range("rxPacketsDropped", 28, 31),
        ),
        (
            "get package status",
            ResponseLayout::new().range("packageStatus", 0, 3),
        ),
        (
            "get package uuid",
            ResponseLayout::new().range("uuid", 0, 15),
        ),
        // ========== MCTP control ==========
        (
            "get endpoint id",
            ResponseLayout::new()
                .offset("endpointId", 0)
                .offset("endpointType", 1)
                .offset("mediumSpecific", 2),
        ),
        (
            "get endpoint uuid",
            ResponseLayout::new().range("uuid", 0, 15),
        ),
        (
            "get mctp version support",
            ResponseLayout::new()
                .offset("versionCount", 0)
                .range("version", 1, 4),
        ),
        (
            "get message type support",
            ResponseLayout::new().offset("messageTypeCount", 0),
        ),
        // ========== PLDM base ==========
        ("get tid", ResponseLayout::new().offset("tid", 0)),
        (
            "get pldm version",
            ResponseLayout::new()
                .range("nextTransferHandle", 0, 3)
                .offset("transferFlag", 4)
                .range("version", 5, 8),
        ),
        (
            "get pldm types",
            ResponseLayout::new().range("types", 0, 7),
        ),
        (
            "get pldm commands",
            ResponseLayout::new().range("commands", 0, 31),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CommandCatalog;
    use crate::error::ErrorKind;
    use crate::extract::{extract_fields, ExtractMode};

    #[test]
    fn test_builtin_layouts_name_catalog_commands() {
        let catalog = CommandCatalog::builtin();
        for (name, layout) in LayoutTable::builtin().iter() {
            assert!(catalog.entry(name).is_ok(), "layout for unknown command {}", name);
            for field in layout.fields() {
                field.at.validate(&field.name).unwrap();
            }
        }
    }

    #[test]
    fn test_layout_lookup() {
        let layout = LayoutTable::builtin().layout("get version id").unwrap();
        assert_eq!(layout.get("firmwareName").unwrap(), FieldLayout::StringRange(8, 19));
        assert_eq!(layout.min_payload_tokens(), 36);
        assert!(layout.get("serialNumber").is_err());
        assert!(LayoutTable::builtin().get("enable channel").is_none());
    }

    #[test]
    fn test_min_payload_tokens_saturates() {
        let layout = ResponseLayout::new()
            .offset("first", 0)
            .range("huge", 1, usize::MAX);
        assert_eq!(layout.min_payload_tokens(), usize::MAX);

        let payload = vec!["00".to_string(); 4];
        let err = extract_fields(&payload, &layout, ExtractMode::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionBounds);
    }

    #[test]
    fn test_reversed_range() {
        assert!(FieldLayout::Range(4, 2).validate("x").is_err());
        assert!(FieldLayout::Offset(4).validate("x").is_ok());
    }
}
