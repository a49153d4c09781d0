//! Request frame assembly.
//!
//! ## NCSI frame
//!
//! | Position | Tokens | Value                                 |
//! |----------|--------|---------------------------------------|
//! | 1        | 1      | management controller id              |
//! | 2        | 1      | header revision                       |
//! | 3        | 1      | reserved (0)                          |
//! | 4        | 1      | instance id                           |
//! | 5        | 1      | command code (control packet type)    |
//! | 6        | 1      | channel id                            |
//! | 7        | 1      | payload length, high part             |
//! | 8        | 1      | payload length, low part              |
//! | 9        | 8      | reserved (0)                          |
//! | payload  | n      | caller bytes, or n zeros              |
//! | pad      | 4      | zeros                                 |
//! | checksum | 4      | zeros (placeholder)                   |
//!
//! ## MCTP control / PLDM frames
//!
//! A short header (`0x80 | iid`, then the PLDM type byte for PLDM, then the
//! command code) followed by the payload. No pad or checksum.

use crate::catalog::CommandFields;
use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::family::MessageType;
use crate::token::{hex_token, hex_tokens};
use serde::{Deserialize, Serialize};

/// Validated 13-bit payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PayloadLength(u16);

impl PayloadLength {
    /// Validate a payload length (0..=8191).
    pub fn new(len: u16) -> CodecResult<Self> {
        if len > MAX_PAYLOAD_LEN {
            return Err(CodecError::validation(
                "payload length",
                format!("{} exceeds {}", len, MAX_PAYLOAD_LEN),
            ));
        }
        Ok(PayloadLength(len))
    }

    /// The length in bytes.
    pub fn get(&self) -> u16 {
        self.0
    }

    /// Split into the (high, low) pair sent on the wire.
    ///
    /// Lengths below 255 go out as `(0, len)`, anything else as
    /// `(len - 255, 255)`. The pair only reads back as a high/low byte split
    /// for lengths below 510; the rule is kept exactly as the tooling expects.
    pub fn split(&self) -> (u16, u16) {
        if self.0 < PAYLOAD_LEN_SPLIT {
            (0, self.0)
        } else {
            (self.0 - PAYLOAD_LEN_SPLIT, PAYLOAD_LEN_SPLIT)
        }
    }
}

impl TryFrom<u16> for PayloadLength {
    type Error = CodecError;

    fn try_from(len: u16) -> Result<Self, Self::Error> {
        PayloadLength::new(len)
    }
}

impl From<PayloadLength> for u16 {
    fn from(len: PayloadLength) -> Self {
        len.0
    }
}

/// Validate and split a payload length in one step.
pub fn split_payload_len(len: u16) -> CodecResult<(u16, u16)> {
    Ok(PayloadLength::new(len)?.split())
}

/// One named header position and the tokens it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FramePosition {
    /// Field name from the family's field catalog.
    pub name: &'static str,
    /// Rendered tokens.
    pub tokens: Vec<String>,
}

/// A built request frame, kept in its structured form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Family the frame was built for.
    pub family: MessageType,
    /// Header positions in wire order.
    pub header: Vec<FramePosition>,
    /// Payload tokens.
    pub payload: Vec<String>,
    /// Zero pad after the payload (NCSI only).
    pub pad: Vec<String>,
    /// Checksum placeholder (NCSI only).
    pub checksum: Vec<String>,
}

impl Frame {
    /// Flatten the frame into its token sequence.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.token_count());
        for position in &self.header {
            tokens.extend(position.tokens.iter().cloned());
        }
        tokens.extend(self.payload.iter().cloned());
        tokens.extend(self.pad.iter().cloned());
        tokens.extend(self.checksum.iter().cloned());
        tokens
    }

    /// Total number of tokens.
    pub fn token_count(&self) -> usize {
        self.header.iter().map(|p| p.tokens.len()).sum::<usize>()
            + self.payload.len()
            + self.pad.len()
            + self.checksum.len()
    }

    /// The tokens of a named header position.
    pub fn header_tokens(&self, name: &str) -> Option<&[String]> {
        self.header
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.tokens.as_slice())
    }
}

/// Build the request frame for a family from merged fields.
pub fn build_frame(family: MessageType, fields: &CommandFields) -> CodecResult<Frame> {
    let header_spec = family.request_header()?;
    let len = PayloadLength::new(fields.payload_len)?;
    fields.check_payload()?;

    let values: Vec<Vec<String>> = match family {
        MessageType::Ncsi => encode_ncsi_header(fields, len),
        MessageType::Mctp => encode_mctp_header(fields)?,
        MessageType::Pldm => encode_pldm_header(fields)?,
        _ => return Err(CodecError::validation("message type", family.as_str())),
    };

    let header = header_spec
        .iter()
        .zip(values)
        .map(|(spec, tokens)| FramePosition {
            name: spec.name,
            tokens,
        })
        .collect();

    let payload = match fields.payload {
        Some(ref bytes) => hex_tokens(bytes),
        None => vec![hex_token(0); len.get() as usize],
    };

    let (pad, checksum) = if family == MessageType::Ncsi {
        (
            vec![hex_token(0); NCSI_PAD_TOKENS],
            vec![hex_token(0); NCSI_CHECKSUM_TOKENS],
        )
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(Frame {
        family,
        header,
        payload,
        pad,
        checksum,
    })
}

/// Build a frame and flatten it to tokens.
pub fn build_tokens(family: MessageType, fields: &CommandFields) -> CodecResult<Vec<String>> {
    Ok(build_frame(family, fields)?.tokens())
}

fn encode_ncsi_header(fields: &CommandFields, len: PayloadLength) -> Vec<Vec<String>> {
    let (high, low) = len.split();
    vec![
        vec![hex_token(fields.mc_id as u32)],
        vec![hex_token(fields.header_rev as u32)],
        vec![hex_token(0)],
        vec![hex_token(fields.instance_id as u32)],
        vec![hex_token(fields.command_code as u32)],
        vec![hex_token(fields.channel_id as u32)],
        vec![hex_token(high as u32)],
        vec![hex_token(low as u32)],
        vec![hex_token(0); NCSI_HEADER_RESERVED_TOKENS],
    ]
}

fn encode_mctp_header(fields: &CommandFields) -> CodecResult<Vec<Vec<String>>> {
    Ok(vec![
        vec![hex_token(request_byte(fields.instance_id)? as u32)],
        vec![hex_token(fields.command_code as u32)],
    ])
}

fn encode_pldm_header(fields: &CommandFields) -> CodecResult<Vec<Vec<String>>> {
    if fields.pldm_type > MAX_PLDM_TYPE {
        return Err(CodecError::validation(
            "pldm type",
            format!("{} exceeds {}", fields.pldm_type, MAX_PLDM_TYPE),
        ));
    }
    let version_and_type = (PLDM_HEADER_VERSION << 6) | fields.pldm_type;
    Ok(vec![
        vec![hex_token(request_byte(fields.instance_id)? as u32)],
        vec![hex_token(version_and_type as u32)],
        vec![hex_token(fields.command_code as u32)],
    ])
}

/// Request bit plus the 5-bit instance id.
fn request_byte(instance_id: u8) -> CodecResult<u8> {
    if instance_id > MAX_MCTP_INSTANCE_ID {
        return Err(CodecError::validation(
            "instance id",
            format!("{} exceeds {}", instance_id, MAX_MCTP_INSTANCE_ID),
        ));
    }
    Ok(MCTP_REQUEST_BIT | instance_id)
}
