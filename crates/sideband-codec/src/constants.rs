//! Protocol constants
//!
//! Command codes, status codes and fixed frame dimensions for NCSI, MCTP
//! control, PLDM and the SMBus mailbox.

// ============================================================================
// MCTP Message Types
// ============================================================================

/// MCTP control message.
pub const MSG_TYPE_MCTP: u8 = 0;
/// PLDM over MCTP.
pub const MSG_TYPE_PLDM: u8 = 1;
/// NCSI over MCTP.
pub const MSG_TYPE_NCSI: u8 = 2;
/// Ethernet over MCTP.
pub const MSG_TYPE_ETHERNET: u8 = 3;
/// NVMe Management Interface over MCTP.
pub const MSG_TYPE_NVME: u8 = 4;
/// SPDM over MCTP.
pub const MSG_TYPE_SPDM: u8 = 5;
/// Secured message (SPDM session).
pub const MSG_TYPE_SECURED: u8 = 6;

// ============================================================================
// NCSI Frame Layout
// ============================================================================

/// Largest value the 13-bit payload length field may carry.
pub const MAX_PAYLOAD_LEN: u16 = 8191;
/// Payload lengths below this are sent as `(0, len)`.
pub const PAYLOAD_LEN_SPLIT: u16 = 255;
/// Reserved zero tokens closing the NCSI header.
pub const NCSI_HEADER_RESERVED_TOKENS: usize = 8;
/// Zero pad tokens after the NCSI payload.
pub const NCSI_PAD_TOKENS: usize = 4;
/// Checksum placeholder tokens at the end of an NCSI frame.
pub const NCSI_CHECKSUM_TOKENS: usize = 4;

/// Fixed single-token header fields at the start of an NCSI response.
pub const NCSI_RESPONSE_HEADER_TOKENS: usize = 9;
/// Payload length block (length plus reserved header bytes).
pub const NCSI_RESPONSE_PAYLEN_TOKENS: usize = 10;
/// Response code width.
pub const NCSI_RESPONSE_CODE_TOKENS: usize = 2;
/// Reason code width.
pub const NCSI_RESPONSE_REASON_TOKENS: usize = 2;

/// MCTP request bit in the first MCTP control / PLDM header byte.
pub const MCTP_REQUEST_BIT: u8 = 0x80;
/// Largest MCTP/PLDM instance id (5 bits).
pub const MAX_MCTP_INSTANCE_ID: u8 = 0x1F;
/// Largest PLDM type (6 bits).
pub const MAX_PLDM_TYPE: u8 = 0x3F;
/// PLDM header version emitted in requests.
pub const PLDM_HEADER_VERSION: u8 = 0;

// ============================================================================
// NCSI Command Codes (DSP0222)
// ============================================================================

/// Clear initial state.
pub const NCSI_CLEAR_INITIAL_STATE: u8 = 0x00;
/// Select package.
pub const NCSI_SELECT_PACKAGE: u8 = 0x01;
/// Deselect package.
pub const NCSI_DESELECT_PACKAGE: u8 = 0x02;
/// Enable channel.
pub const NCSI_ENABLE_CHANNEL: u8 = 0x03;
/// Disable channel.
pub const NCSI_DISABLE_CHANNEL: u8 = 0x04;
/// Reset channel.
pub const NCSI_RESET_CHANNEL: u8 = 0x05;
/// Enable channel network TX.
pub const NCSI_ENABLE_CHANNEL_NETWORK_TX: u8 = 0x06;
/// Disable channel network TX.
pub const NCSI_DISABLE_CHANNEL_NETWORK_TX: u8 = 0x07;
/// AEN enable.
pub const NCSI_AEN_ENABLE: u8 = 0x08;
/// Set link.
pub const NCSI_SET_LINK: u8 = 0x09;
/// Get link status.
pub const NCSI_GET_LINK_STATUS: u8 = 0x0A;
/// Set VLAN filter.
pub const NCSI_SET_VLAN_FILTER: u8 = 0x0B;
/// Enable VLAN.
pub const NCSI_ENABLE_VLAN: u8 = 0x0C;
/// Disable VLAN.
pub const NCSI_DISABLE_VLAN: u8 = 0x0D;
/// Set MAC address.
pub const NCSI_SET_MAC_ADDRESS: u8 = 0x0E;
/// Enable broadcast filter.
pub const NCSI_ENABLE_BROADCAST_FILTER: u8 = 0x10;
/// Disable broadcast filter.
pub const NCSI_DISABLE_BROADCAST_FILTER: u8 = 0x11;
/// Enable global multicast filter.
pub const NCSI_ENABLE_GLOBAL_MULTICAST_FILTER: u8 = 0x12;
/// Disable global multicast filter.
pub const NCSI_DISABLE_GLOBAL_MULTICAST_FILTER: u8 = 0x13;
/// Set NC-SI flow control.
pub const NCSI_SET_FLOW_CONTROL: u8 = 0x14;
/// Get version ID.
pub const NCSI_GET_VERSION_ID: u8 = 0x15;
/// Get capabilities.
pub const NCSI_GET_CAPABILITIES: u8 = 0x16;
/// Get parameters.
pub const NCSI_GET_PARAMETERS: u8 = 0x17;
/// Get controller packet statistics.
pub const NCSI_GET_CONTROLLER_PACKET_STATISTICS: u8 = 0x18;
/// Get NC-SI statistics.
pub const NCSI_GET_NCSI_STATISTICS: u8 = 0x19;
/// Get NC-SI pass-through statistics.
pub const NCSI_GET_PASSTHROUGH_STATISTICS: u8 = 0x1A;
/// Get package status.
pub const NCSI_GET_PACKAGE_STATUS: u8 = 0x1B;
/// OEM command.
pub const NCSI_OEM_COMMAND: u8 = 0x50;
/// PLDM request carried in NCSI.
pub const NCSI_PLDM_REQUEST: u8 = 0x51;
/// Get package UUID.
pub const NCSI_GET_PACKAGE_UUID: u8 = 0x52;

/// Channel id addressing the whole package rather than one channel.
pub const NCSI_PACKAGE_CHANNEL: u8 = 0x1F;

// ============================================================================
// NCSI Response / Reason Codes
// ============================================================================

/// Command completed.
pub const NCSI_RESPONSE_COMPLETED: u16 = 0x0000;
/// Command failed.
pub const NCSI_RESPONSE_FAILED: u16 = 0x0001;
/// Command unavailable.
pub const NCSI_RESPONSE_UNAVAILABLE: u16 = 0x0002;
/// Command unsupported.
pub const NCSI_RESPONSE_UNSUPPORTED: u16 = 0x0003;
/// First vendor-specific response code.
pub const NCSI_RESPONSE_VENDOR_BASE: u16 = 0x8000;

/// No error.
pub const NCSI_REASON_NONE: u16 = 0x0000;
/// Interface initialization required.
pub const NCSI_REASON_INIT_REQUIRED: u16 = 0x0001;
/// Parameter invalid or out of range.
pub const NCSI_REASON_PARAMETER_INVALID: u16 = 0x0002;
/// Channel not ready.
pub const NCSI_REASON_CHANNEL_NOT_READY: u16 = 0x0003;
/// Package not ready.
pub const NCSI_REASON_PACKAGE_NOT_READY: u16 = 0x0004;
/// Invalid payload length.
pub const NCSI_REASON_INVALID_PAYLOAD_LEN: u16 = 0x0005;
/// Information not available.
pub const NCSI_REASON_INFO_NOT_AVAILABLE: u16 = 0x0006;
/// Unknown or unsupported command type.
pub const NCSI_REASON_UNKNOWN_COMMAND: u16 = 0x7FFF;
/// First vendor-specific reason code.
pub const NCSI_REASON_VENDOR_BASE: u16 = 0x8000;

// ============================================================================
// MCTP Control Command Codes (DSP0236)
// ============================================================================

/// Get endpoint ID.
pub const MCTP_GET_ENDPOINT_ID: u8 = 0x02;
/// Get endpoint UUID.
pub const MCTP_GET_ENDPOINT_UUID: u8 = 0x03;
/// Get MCTP version support.
pub const MCTP_GET_VERSION_SUPPORT: u8 = 0x04;
/// Get message type support.
pub const MCTP_GET_MESSAGE_TYPE_SUPPORT: u8 = 0x05;
/// Get vendor defined message support.
pub const MCTP_GET_VENDOR_MESSAGE_SUPPORT: u8 = 0x06;

// ============================================================================
// PLDM Base Commands (DSP0240, type 0)
// ============================================================================

/// PLDM messaging control and discovery.
pub const PLDM_TYPE_BASE: u8 = 0x00;
/// Get terminus ID.
pub const PLDM_GET_TID: u8 = 0x02;
/// Get PLDM version.
pub const PLDM_GET_PLDM_VERSION: u8 = 0x03;
/// Get PLDM types.
pub const PLDM_GET_PLDM_TYPES: u8 = 0x04;
/// Get PLDM commands.
pub const PLDM_GET_PLDM_COMMANDS: u8 = 0x05;

// ============================================================================
// MCTP / PLDM Completion Codes
// ============================================================================

/// Success.
pub const CC_SUCCESS: u8 = 0x00;
/// Generic failure.
pub const CC_ERROR: u8 = 0x01;
/// Invalid data.
pub const CC_ERROR_INVALID_DATA: u8 = 0x02;
/// Invalid length.
pub const CC_ERROR_INVALID_LENGTH: u8 = 0x03;
/// Not ready.
pub const CC_ERROR_NOT_READY: u8 = 0x04;
/// Unsupported command.
pub const CC_ERROR_UNSUPPORTED_CMD: u8 = 0x05;
/// Invalid PLDM type.
pub const CC_ERROR_INVALID_PLDM_TYPE: u8 = 0x20;

// ============================================================================
// SMBus Mailbox
// ============================================================================

/// Default 7-bit slave address of the management mailbox.
pub const BUS_DEFAULT_SLAVE_ADDR: u8 = 0x32;
/// Largest 7-bit slave address.
pub const MAX_BUS_SLAVE_ADDR: u8 = 0x7F;

/// Get device status.
pub const BUS_OP_GET_STATUS: u8 = 0x01;
/// Get firmware version.
pub const BUS_OP_GET_FIRMWARE_VERSION: u8 = 0x02;
/// Get device name.
pub const BUS_OP_GET_DEVICE_NAME: u8 = 0x03;
/// Get temperature.
pub const BUS_OP_GET_TEMPERATURE: u8 = 0x04;
/// Get MAC address of a port.
pub const BUS_OP_GET_MAC_ADDRESS: u8 = 0x05;
/// Get link state of a port.
pub const BUS_OP_GET_LINK_STATE: u8 = 0x06;
/// Request a device reset.
pub const BUS_OP_RESET: u8 = 0x07;
/// Read the result of the last deferred operation.
pub const BUS_OP_GET_RESULT: u8 = 0x08;

/// Operation succeeded.
pub const BUS_RESULT_SUCCESS: u8 = 0x00;
/// Operation accepted, result pending.
pub const BUS_RESULT_PENDING: u8 = 0x01;
/// Request malformed.
pub const BUS_RESULT_INVALID_REQUEST: u8 = 0x02;
/// Device not ready.
pub const BUS_RESULT_NOT_READY: u8 = 0x03;
/// Device busy.
pub const BUS_RESULT_BUSY: u8 = 0x04;
/// Target does not exist.
pub const BUS_RESULT_NOT_EXIST: u8 = 0x05;

// ============================================================================
// Executor Output
// ============================================================================

/// Marker preceding the raw response line in executor output.
pub const RAW_RESPONSE_MARKER: &str = "raw response";
/// Flag asking the executor to decode the response.
pub const FLAG_DECODE_RESPONSE: &str = "-d";
/// Flag preceding the slave address argument.
pub const FLAG_SLAVE_ADDR: &str = "-s";
/// Non-interactive flag of the bus transfer tool.
pub const FLAG_BUS_YES: &str = "-y";
/// Name used for the bus tool's read line when it is missing.
pub const BUS_READ_LINE: &str = "bus read data";
