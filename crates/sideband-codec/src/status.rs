//! Status vocabularies decoded from response fields.

use crate::constants::*;
use serde::Serialize;
use std::fmt;

/// NCSI response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseCode {
    /// Command completed.
    Completed,
    /// Command failed.
    Failed,
    /// Command unavailable.
    Unavailable,
    /// Command unsupported.
    Unsupported,
    /// Vendor-specific code (0x8000 and up).
    Vendor(u16),
    /// Any other code.
    Unknown(u16),
}

impl ResponseCode {
    /// Whether the command completed.
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseCode::Completed)
    }
}

impl From<u16> for ResponseCode {
    fn from(code: u16) -> Self {
        match code {
            NCSI_RESPONSE_COMPLETED => ResponseCode::Completed,
            NCSI_RESPONSE_FAILED => ResponseCode::Failed,
            NCSI_RESPONSE_UNAVAILABLE => ResponseCode::Unavailable,
            NCSI_RESPONSE_UNSUPPORTED => ResponseCode::Unsupported,
            c if c >= NCSI_RESPONSE_VENDOR_BASE => ResponseCode::Vendor(c),
            c => ResponseCode::Unknown(c),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Completed => write!(f, "command completed"),
            ResponseCode::Failed => write!(f, "command failed"),
            ResponseCode::Unavailable => write!(f, "command unavailable"),
            ResponseCode::Unsupported => write!(f, "command unsupported"),
            ResponseCode::Vendor(code) => write!(f, "vendor response (0x{:04X})", code),
            ResponseCode::Unknown(code) => write!(f, "unknown response (0x{:04X})", code),
        }
    }
}

/// NCSI reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReasonCode {
    /// No error.
    NoError,
    /// Interface initialization required.
    InitializationRequired,
    /// Parameter invalid or out of range.
    ParameterInvalid,
    /// Channel not ready.
    ChannelNotReady,
    /// Package not ready.
    PackageNotReady,
    /// Invalid payload length.
    InvalidPayloadLength,
    /// Information not available.
    InformationNotAvailable,
    /// Unknown or unsupported command type.
    UnknownCommandType,
    /// Vendor-specific reason (0x8000 and up).
    Vendor(u16),
    /// Any other reason.
    Unknown(u16),
}

impl From<u16> for ReasonCode {
    fn from(code: u16) -> Self {
        match code {
            NCSI_REASON_NONE => ReasonCode::NoError,
            NCSI_REASON_INIT_REQUIRED => ReasonCode::InitializationRequired,
            NCSI_REASON_PARAMETER_INVALID => ReasonCode::ParameterInvalid,
            NCSI_REASON_CHANNEL_NOT_READY => ReasonCode::ChannelNotReady,
            NCSI_REASON_PACKAGE_NOT_READY => ReasonCode::PackageNotReady,
            NCSI_REASON_INVALID_PAYLOAD_LEN => ReasonCode::InvalidPayloadLength,
            NCSI_REASON_INFO_NOT_AVAILABLE => ReasonCode::InformationNotAvailable,
            NCSI_REASON_UNKNOWN_COMMAND => ReasonCode::UnknownCommandType,
            c if c >= NCSI_REASON_VENDOR_BASE => ReasonCode::Vendor(c),
            c => ReasonCode::Unknown(c),
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonCode::NoError => write!(f, "no error"),
            ReasonCode::InitializationRequired => write!(f, "interface initialization required"),
            ReasonCode::ParameterInvalid => write!(f, "parameter invalid"),
            ReasonCode::ChannelNotReady => write!(f, "channel not ready"),
            ReasonCode::PackageNotReady => write!(f, "package not ready"),
            ReasonCode::InvalidPayloadLength => write!(f, "invalid payload length"),
            ReasonCode::InformationNotAvailable => write!(f, "information not available"),
            ReasonCode::UnknownCommandType => write!(f, "unknown command type"),
            ReasonCode::Vendor(code) => write!(f, "vendor reason (0x{:04X})", code),
            ReasonCode::Unknown(code) => write!(f, "unknown reason (0x{:04X})", code),
        }
    }
}

/// Decoded NCSI response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NcsiStatus {
    /// Response code.
    pub code: ResponseCode,
    /// Reason code.
    pub reason: ReasonCode,
}

impl NcsiStatus {
    /// Whether the command completed.
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

impl fmt::Display for NcsiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.reason)
    }
}

/// MCTP control / PLDM completion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionCode {
    /// Success.
    Success,
    /// Generic error.
    Error,
    /// Invalid data.
    InvalidData,
    /// Invalid length.
    InvalidLength,
    /// Not ready.
    NotReady,
    /// Unsupported command.
    UnsupportedCommand,
    /// Invalid PLDM type.
    InvalidPldmType,
    /// Any other code.
    Unknown(u8),
}

impl CompletionCode {
    /// Whether the command succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionCode::Success)
    }
}

impl From<u8> for CompletionCode {
    fn from(code: u8) -> Self {
        match code {
            CC_SUCCESS => CompletionCode::Success,
            CC_ERROR => CompletionCode::Error,
            CC_ERROR_INVALID_DATA => CompletionCode::InvalidData,
            CC_ERROR_INVALID_LENGTH => CompletionCode::InvalidLength,
            CC_ERROR_NOT_READY => CompletionCode::NotReady,
            CC_ERROR_UNSUPPORTED_CMD => CompletionCode::UnsupportedCommand,
            CC_ERROR_INVALID_PLDM_TYPE => CompletionCode::InvalidPldmType,
            c => CompletionCode::Unknown(c),
        }
    }
}

impl fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionCode::Success => write!(f, "success"),
            CompletionCode::Error => write!(f, "error"),
            CompletionCode::InvalidData => write!(f, "invalid data"),
            CompletionCode::InvalidLength => write!(f, "invalid length"),
            CompletionCode::NotReady => write!(f, "not ready"),
            CompletionCode::UnsupportedCommand => write!(f, "unsupported command"),
            CompletionCode::InvalidPldmType => write!(f, "invalid PLDM type"),
            CompletionCode::Unknown(code) => write!(f, "unknown completion code (0x{:02X})", code),
        }
    }
}

/// Result code reported by the SMBus mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BusResultCode {
    /// Operation succeeded.
    Success,
    /// Accepted, result pending.
    Pending,
    /// Request malformed.
    InvalidRequest,
    /// Device not ready.
    NotReady,
    /// Device busy.
    Busy,
    /// Target does not exist.
    NotExist,
    /// Any other code.
    Unknown(u8),
}

impl BusResultCode {
    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, BusResultCode::Success)
    }
}

impl From<u8> for BusResultCode {
    fn from(code: u8) -> Self {
        match code {
            BUS_RESULT_SUCCESS => BusResultCode::Success,
            BUS_RESULT_PENDING => BusResultCode::Pending,
            BUS_RESULT_INVALID_REQUEST => BusResultCode::InvalidRequest,
            BUS_RESULT_NOT_READY => BusResultCode::NotReady,
            BUS_RESULT_BUSY => BusResultCode::Busy,
            BUS_RESULT_NOT_EXIST => BusResultCode::NotExist,
            c => BusResultCode::Unknown(c),
        }
    }
}

impl From<BusResultCode> for u8 {
    fn from(code: BusResultCode) -> Self {
        match code {
            BusResultCode::Success => BUS_RESULT_SUCCESS,
            BusResultCode::Pending => BUS_RESULT_PENDING,
            BusResultCode::InvalidRequest => BUS_RESULT_INVALID_REQUEST,
            BusResultCode::NotReady => BUS_RESULT_NOT_READY,
            BusResultCode::Busy => BUS_RESULT_BUSY,
            BusResultCode::NotExist => BUS_RESULT_NOT_EXIST,
            BusResultCode::Unknown(code) => code,
        }
    }
}

impl fmt::Display for BusResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusResultCode::Success => write!(f, "success"),
            BusResultCode::Pending => write!(f, "pending"),
            BusResultCode::InvalidRequest => write!(f, "invalid request"),
            BusResultCode::NotReady => write!(f, "not ready"),
            BusResultCode::Busy => write!(f, "busy"),
            BusResultCode::NotExist => write!(f, "not exist"),
            BusResultCode::Unknown(code) => write!(f, "unknown result (0x{:02X})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ncsi_codes() {
        assert_eq!(ResponseCode::from(0), ResponseCode::Completed);
        assert_eq!(ResponseCode::from(3), ResponseCode::Unsupported);
        assert_eq!(ResponseCode::from(0x8001), ResponseCode::Vendor(0x8001));
        assert_eq!(ReasonCode::from(0x7fff), ReasonCode::UnknownCommandType);
        assert_eq!(ReasonCode::from(9), ReasonCode::Unknown(9));

        let status = NcsiStatus {
            code: ResponseCode::Failed,
            reason: ReasonCode::ChannelNotReady,
        };
        assert!(!status.is_success());
        assert_eq!(status.to_string(), "command failed (channel not ready)");
    }

    #[test]
    fn test_bus_result_codes_round_trip() {
        for code in 0..=6u8 {
            assert_eq!(u8::from(BusResultCode::from(code)), code);
        }
        assert_eq!(BusResultCode::from(4).to_string(), "busy");
        assert_eq!(BusResultCode::from(5), BusResultCode::NotExist);
    }

    #[test]
    fn test_completion_codes() {
        assert!(CompletionCode::from(0).is_success());
        assert_eq!(CompletionCode::from(0x20), CompletionCode::InvalidPldmType);
    }
}
