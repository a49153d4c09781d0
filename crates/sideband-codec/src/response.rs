//! Response parsing.
//!
//! The executor hands back one line of whitespace-separated hex tokens. The
//! parser slices it into the family's fixed header, the NCSI length, code and
//! reason blocks, and the payload, then runs the command's layout (if one is
//! registered) over the payload.
//!
//! ## NCSI response
//!
//! | Tokens | Field                                                      |
//! |--------|------------------------------------------------------------|
//! | 0..9   | sourceId tag msgType mcId headerRev reserved instanceId packetType channel |
//! | 9..19  | PayLen                                                     |
//! | 19..21 | ResponseCode (big endian)                                  |
//! | 21..23 | ResponseReason (big endian)                                |
//! | 23..   | Payload                                                    |
//!
//! MCTP control responses carry six header tokens ending in the completion
//! code, PLDM responses seven; everything after is data.

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::extract::{extract_fields, ExtractMode, FieldMap, FieldValue};
use crate::family::MessageType;
use crate::layout::LayoutTable;
use crate::status::{CompletionCode, NcsiStatus, ReasonCode, ResponseCode};
use crate::token::{parse_be, parse_token};
use serde::Serialize;

/// Tokens of one captured response line. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawResponse {
    tokens: Vec<String>,
}

impl RawResponse {
    /// Wrap already split tokens.
    pub fn new(tokens: Vec<String>) -> Self {
        RawResponse { tokens }
    }

    /// Split a response line on whitespace.
    pub fn from_line(line: &str) -> Self {
        RawResponse {
            tokens: line.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// The tokens in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the line had no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// One named header token of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderValue {
    /// Field name from the family's response header.
    pub name: &'static str,
    /// The token as received.
    pub value: String,
}

/// Everything after the fixed response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseBody {
    /// NCSI length, status and payload blocks.
    #[serde(rename_all = "camelCase")]
    Ncsi {
        /// The ten PayLen tokens.
        payload_len: Vec<String>,
        /// Two-token response code.
        response_code: Vec<String>,
        /// Two-token reason code.
        response_reason: Vec<String>,
        /// Command payload.
        payload: Vec<String>,
    },
    /// MCTP control or PLDM data following the completion code.
    Data {
        /// Response data.
        data: Vec<String>,
    },
}

/// A parsed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Family the response was parsed as.
    pub family: MessageType,
    /// Command the response answers, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Fixed header tokens in order.
    pub header: Vec<HeaderValue>,
    /// Length, status and payload segments.
    pub body: ResponseBody,
    /// Fields extracted by the command's layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldMap>,
}

impl Response {
    /// Look up a header token by name.
    pub fn header_value(&self, name: &str) -> CodecResult<&str> {
        self.header
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
            .ok_or_else(|| CodecError::MissingField(name.to_string()))
    }

    /// The payload (NCSI) or data (MCTP, PLDM) segment.
    pub fn payload(&self) -> &[String] {
        match &self.body {
            ResponseBody::Ncsi { payload, .. } => payload,
            ResponseBody::Data { data } => data,
        }
    }

    /// Look up an extracted field.
    pub fn field(&self, name: &str) -> CodecResult<&FieldValue> {
        match &self.fields {
            Some(fields) => fields.get(name),
            None => Err(CodecError::MissingField(name.to_string())),
        }
    }

    /// Decode the NCSI response and reason codes.
    pub fn ncsi_status(&self) -> CodecResult<NcsiStatus> {
        match &self.body {
            ResponseBody::Ncsi {
                response_code,
                response_reason,
                ..
            } => Ok(NcsiStatus {
                code: ResponseCode::from(parse_be("response code", response_code)? as u16),
                reason: ReasonCode::from(parse_be("response reason", response_reason)? as u16),
            }),
            ResponseBody::Data { .. } => Err(CodecError::MissingField("responseCode".into())),
        }
    }

    /// Decode the MCTP or PLDM completion code.
    pub fn completion_code(&self) -> CodecResult<CompletionCode> {
        let token = self.header_value("completionCode")?;
        let code = parse_token("completion code", token)?;
        let code = u8::try_from(code).map_err(|_| {
            CodecError::validation("completion code", format!("'{}' is wider than one byte", token))
        })?;
        Ok(CompletionCode::from(code))
    }
}

/// Splits raw responses and applies layouts.
#[derive(Debug, Clone, Copy)]
pub struct ResponseParser<'a> {
    layouts: &'a LayoutTable,
    mode: ExtractMode,
}

impl<'a> ResponseParser<'a> {
    /// Create a parser over a layout table, in strict mode.
    pub fn new(layouts: &'a LayoutTable) -> Self {
        ResponseParser {
            layouts,
            mode: ExtractMode::Strict,
        }
    }

    /// Set the extraction mode.
    pub fn with_mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parse a raw response for a family.
    ///
    /// Layout extraction runs only when `command` names a registered layout.
    pub fn parse(
        &self,
        family: MessageType,
        command: Option<&str>,
        raw: &RawResponse,
    ) -> CodecResult<Response> {
        let header_spec = family.response_header()?;
        let expected = family.min_response_tokens()?;
        let tokens = raw.tokens();
        if tokens.len() < expected {
            return Err(CodecError::TruncatedResponse {
                expected,
                actual: tokens.len(),
            });
        }

        let header = header_spec
            .iter()
            .zip(tokens)
            .map(|(spec, value)| HeaderValue {
                name: spec.name,
                value: value.clone(),
            })
            .collect();

        let rest = &tokens[header_spec.len()..];
        let body = match family {
            MessageType::Ncsi => {
                let (payload_len, rest) = rest.split_at(NCSI_RESPONSE_PAYLEN_TOKENS);
                let (response_code, rest) = rest.split_at(NCSI_RESPONSE_CODE_TOKENS);
                let (response_reason, payload) = rest.split_at(NCSI_RESPONSE_REASON_TOKENS);
                ResponseBody::Ncsi {
                    payload_len: payload_len.to_vec(),
                    response_code: response_code.to_vec(),
                    response_reason: response_reason.to_vec(),
                    payload: payload.to_vec(),
                }
            }
            _ => ResponseBody::Data {
                data: rest.to_vec(),
            },
        };

        let mut response = Response {
            family,
            command: command.map(str::to_string),
            header,
            body,
            fields: None,
        };

        if let Some(layout) = command.and_then(|c| self.layouts.get(c)) {
            response.fields = Some(extract_fields(response.payload(), layout, self.mode)?);
        }
        Ok(response)
    }
}

impl Default for ResponseParser<'static> {
    fn default() -> Self {
        ResponseParser::new(LayoutTable::builtin())
    }
}

/// Parse with the built-in layouts in strict mode.
pub fn parse_response(
    family: MessageType,
    command: Option<&str>,
    raw: &RawResponse,
) -> CodecResult<Response> {
    ResponseParser::default().parse(family, command, raw)
}
