//! Message-type families and their fixed header field catalogs.

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MCTP message type carried by an executor invocation.
///
/// Only [`MessageType::Ncsi`], [`MessageType::Mctp`] and [`MessageType::Pldm`]
/// have frame builders and response parsers; the remaining types are accepted
/// on the command line but rejected when a frame is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// MCTP control.
    #[serde(rename = "MCTP")]
    Mctp,
    /// PLDM over MCTP.
    #[serde(rename = "PLDM")]
    Pldm,
    /// NCSI over MCTP.
    #[serde(rename = "NCSI")]
    Ncsi,
    /// Ethernet over MCTP.
    #[serde(rename = "ETH")]
    Ethernet,
    /// NVMe-MI over MCTP.
    #[serde(rename = "NVME")]
    Nvme,
    /// SPDM over MCTP.
    #[serde(rename = "SPDM")]
    Spdm,
    /// Secured message.
    #[serde(rename = "SecMsg")]
    SecuredMessage,
}

impl MessageType {
    /// All message types in code order.
    pub const ALL: [MessageType; 7] = [
        MessageType::Mctp,
        MessageType::Pldm,
        MessageType::Ncsi,
        MessageType::Ethernet,
        MessageType::Nvme,
        MessageType::Spdm,
        MessageType::SecuredMessage,
    ];

    /// The numeric message type passed to the executor.
    pub fn code(&self) -> u8 {
        match self {
            MessageType::Mctp => MSG_TYPE_MCTP,
            MessageType::Pldm => MSG_TYPE_PLDM,
            MessageType::Ncsi => MSG_TYPE_NCSI,
            MessageType::Ethernet => MSG_TYPE_ETHERNET,
            MessageType::Nvme => MSG_TYPE_NVME,
            MessageType::Spdm => MSG_TYPE_SPDM,
            MessageType::SecuredMessage => MSG_TYPE_SECURED,
        }
    }

    /// Get the name used on the command line and in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Mctp => "MCTP",
            MessageType::Pldm => "PLDM",
            MessageType::Ncsi => "NCSI",
            MessageType::Ethernet => "ETH",
            MessageType::Nvme => "NVME",
            MessageType::Spdm => "SPDM",
            MessageType::SecuredMessage => "SecMsg",
        }
    }

    /// Whether frames of this type can be built and parsed.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            MessageType::Ncsi | MessageType::Mctp | MessageType::Pldm
        )
    }

    /// Fail with a validation error unless this family has a codec.
    pub fn ensure_supported(&self) -> CodecResult<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(self.unsupported())
        }
    }

    fn unsupported(&self) -> CodecError {
        CodecError::validation(
            "message type",
            format!("no frame codec for {}", self.as_str()),
        )
    }

    /// Ordered request header fields for this family.
    pub fn request_header(&self) -> CodecResult<&'static [FieldSpec]> {
        match self {
            MessageType::Ncsi => Ok(NCSI_REQUEST_HEADER),
            MessageType::Mctp => Ok(MCTP_REQUEST_HEADER),
            MessageType::Pldm => Ok(PLDM_REQUEST_HEADER),
            _ => Err(self.unsupported()),
        }
    }

    /// Ordered single-token header fields at the start of a response.
    pub fn response_header(&self) -> CodecResult<&'static [FieldSpec]> {
        match self {
            MessageType::Ncsi => Ok(NCSI_RESPONSE_HEADER),
            MessageType::Mctp => Ok(MCTP_RESPONSE_HEADER),
            MessageType::Pldm => Ok(PLDM_RESPONSE_HEADER),
            _ => Err(self.unsupported()),
        }
    }

    /// Minimum token count of a response line for this family.
    pub fn min_response_tokens(&self) -> CodecResult<usize> {
        let header = self.response_header()?.len();
        Ok(match self {
            MessageType::Ncsi => {
                header
                    + NCSI_RESPONSE_PAYLEN_TOKENS
                    + NCSI_RESPONSE_CODE_TOKENS
                    + NCSI_RESPONSE_REASON_TOKENS
            }
            _ => header,
        })
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CodecError::validation("message type", format!("unknown family '{}'", s)))
    }
}

/// One named header position and the number of tokens it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: &'static str,
    /// Width in transport tokens.
    pub width: usize,
}

impl FieldSpec {
    const fn single(name: &'static str) -> Self {
        FieldSpec { name, width: 1 }
    }
}

/// NCSI request header: nine positions, the last holding eight reserved tokens.
pub const NCSI_REQUEST_HEADER: &[FieldSpec] = &[
    FieldSpec::single("managementControllerId"),
    FieldSpec::single("headerRevision"),
    FieldSpec::single("reserved"),
    FieldSpec::single("instanceId"),
    FieldSpec::single("commandCode"),
    FieldSpec::single("channelId"),
    FieldSpec::single("payloadLenHigh"),
    FieldSpec::single("payloadLenLow"),
    FieldSpec {
        name: "reservedTail",
        width: NCSI_HEADER_RESERVED_TOKENS,
    },
];

/// MCTP control request header.
pub const MCTP_REQUEST_HEADER: &[FieldSpec] = &[
    FieldSpec::single("requestFlagsAndInstanceId"),
    FieldSpec::single("commandCode"),
];

/// PLDM request header.
pub const PLDM_REQUEST_HEADER: &[FieldSpec] = &[
    FieldSpec::single("requestFlagsAndInstanceId"),
    FieldSpec::single("headerVersionAndType"),
    FieldSpec::single("commandCode"),
];

/// NCSI response header fields preceding the payload length block.
pub const NCSI_RESPONSE_HEADER: &[FieldSpec] = &[
    FieldSpec::single("sourceId"),
    FieldSpec::single("tag"),
    FieldSpec::single("msgType"),
    FieldSpec::single("mcId"),
    FieldSpec::single("headerRev"),
    FieldSpec::single("reserved"),
    FieldSpec::single("instanceId"),
    FieldSpec::single("packetType"),
    FieldSpec::single("channel"),
];

/// MCTP control response header.
pub const MCTP_RESPONSE_HEADER: &[FieldSpec] = &[
    FieldSpec::single("srcEid"),
    FieldSpec::single("tag"),
    FieldSpec::single("msgType"),
    FieldSpec::single("requestFlagsAndInstanceId"),
    FieldSpec::single("commandCode"),
    FieldSpec::single("completionCode"),
];

/// PLDM response header.
pub const PLDM_RESPONSE_HEADER: &[FieldSpec] = &[
    FieldSpec::single("srcEid"),
    FieldSpec::single("tag"),
    FieldSpec::single("msgType"),
    FieldSpec::single("requestFlagsAndInstanceId"),
    FieldSpec::single("headerVersionAndType"),
    FieldSpec::single("commandCode"),
    FieldSpec::single("completionCode"),
];
