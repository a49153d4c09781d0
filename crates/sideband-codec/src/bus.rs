//! SMBus mailbox variant.
//!
//! Every command is one write-then-read transaction against the mailbox
//! slave, rendered in the transfer tool's message grammar:
//!
//! ```text
//! <bus> w<N>@0x<addr> <opcode> <operands...> r<M>
//! ```
//!
//! `N` counts the opcode plus operands and `M` is the number of bytes read
//! back. The tool prints the bytes it read as one line of hex tokens; when a
//! command's layout starts with a `status` field at offset 0, that byte is
//! decoded as a [`BusResultCode`].

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::extract::{extract_fields, ExtractMode, FieldMap, FieldValue};
use crate::layout::{FieldLayout, LayoutTable, ResponseLayout};
use crate::response::RawResponse;
use crate::status::BusResultCode;
use crate::token::{hex_token, parse_token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Layout field decoded as the mailbox result code.
pub const STATUS_FIELD: &str = "status";

/// One write-then-read mailbox transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusTransaction {
    /// 7-bit slave address.
    pub slave_addr: u8,
    /// Mailbox opcode.
    pub opcode: u8,
    /// Bytes written after the opcode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<u8>,
    /// Bytes read back.
    pub read_len: u8,
}

impl BusTransaction {
    /// A transaction against the default mailbox address.
    pub fn new(opcode: u8, read_len: u8) -> Self {
        BusTransaction {
            slave_addr: BUS_DEFAULT_SLAVE_ADDR,
            opcode,
            operands: Vec::new(),
            read_len,
        }
    }

    /// Set the operand bytes.
    pub fn operands(mut self, operands: Vec<u8>) -> Self {
        self.operands = operands;
        self
    }

    /// Set the slave address.
    pub fn slave(mut self, slave_addr: u8) -> Self {
        self.slave_addr = slave_addr;
        self
    }

    /// Bytes written: the opcode plus operands.
    pub fn write_len(&self) -> usize {
        1 + self.operands.len()
    }

    /// Check the address and read length.
    pub fn validate(&self) -> CodecResult<()> {
        if self.slave_addr > MAX_BUS_SLAVE_ADDR {
            return Err(CodecError::validation(
                "slave address",
                format!("0x{:02x} is not a 7-bit address", self.slave_addr),
            ));
        }
        if self.read_len == 0 {
            return Err(CodecError::validation("read length", "must be at least 1"));
        }
        Ok(())
    }

    /// Render the transfer tokens for a bus number.
    pub fn tokens(&self, bus: u8) -> CodecResult<Vec<String>> {
        self.validate()?;
        let mut tokens = Vec::with_capacity(4 + self.operands.len());
        tokens.push(bus.to_string());
        tokens.push(format!("w{}@0x{:02x}", self.write_len(), self.slave_addr));
        tokens.push(hex_token(self.opcode as u32));
        tokens.extend(self.operands.iter().map(|&b| hex_token(b as u32)));
        tokens.push(format!("r{}", self.read_len));
        Ok(tokens)
    }

    /// Full executor arguments, including the tool's non-interactive flag.
    pub fn invocation(&self, bus: u8) -> CodecResult<Vec<String>> {
        let mut args = vec![FLAG_BUS_YES.to_string()];
        args.extend(self.tokens(bus)?);
        Ok(args)
    }
}

/// Named mailbox transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusCatalog {
    transactions: BTreeMap<String, BusTransaction>,
}

impl BusCatalog {
    /// The built-in mailbox catalog, built on first use.
    pub fn builtin() -> &'static BusCatalog {
        static CATALOG: OnceLock<BusCatalog> = OnceLock::new();
        CATALOG.get_or_init(builtin_transactions)
    }

    /// Built-in layouts for the mailbox catalog.
    pub fn builtin_layouts() -> &'static LayoutTable {
        static LAYOUTS: OnceLock<LayoutTable> = OnceLock::new();
        LAYOUTS.get_or_init(builtin_bus_layouts)
    }

    /// Build a catalog from named transactions.
    pub fn from_transactions<I, S>(transactions: I) -> Self
    where
        I: IntoIterator<Item = (S, BusTransaction)>,
        S: Into<String>,
    {
        BusCatalog {
            transactions: transactions
                .into_iter()
                .map(|(n, t)| (n.into(), t))
                .collect(),
        }
    }

    /// Look up a transaction by name.
    pub fn resolve(&self, name: &str) -> CodecResult<&BusTransaction> {
        self.transactions
            .get(name)
            .ok_or_else(|| CodecError::UnknownCommand(name.to_string()))
    }

    /// Iterate transactions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BusTransaction)> {
        self.transactions.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

fn builtin_transactions() -> BusCatalog {
    BusCatalog::from_transactions([
        ("get status", BusTransaction::new(BUS_OP_GET_STATUS, 4)),
        (
            "get firmware version",
            BusTransaction::new(BUS_OP_GET_FIRMWARE_VERSION, 5),
        ),
        (
            "get device name",
            BusTransaction::new(BUS_OP_GET_DEVICE_NAME, 17),
        ),
        (
            "get temperature",
            BusTransaction::new(BUS_OP_GET_TEMPERATURE, 3).operands(vec![0]),
        ),
        (
            "get mac address",
            BusTransaction::new(BUS_OP_GET_MAC_ADDRESS, 7).operands(vec![0]),
        ),
        (
            "get link state",
            BusTransaction::new(BUS_OP_GET_LINK_STATE, 3).operands(vec![0]),
        ),
        ("reset", BusTransaction::new(BUS_OP_RESET, 1).operands(vec![1])),
        ("get result", BusTransaction::new(BUS_OP_GET_RESULT, 2)),
    ])
}

fn builtin_bus_layouts() -> LayoutTable {
    let status = || ResponseLayout::new().offset(STATUS_FIELD, 0);
    LayoutTable::from_layouts([
        (
            "get status",
            status().offset("deviceState", 1).range("errorFlags", 2, 3),
        ),
        (
            "get firmware version",
            status()
                .offset("major", 1)
                .offset("minor", 2)
                .range("build", 3, 4),
        ),
        ("get device name", status().string("name", 1, 16)),
        (
            "get temperature",
            status().offset("temperature", 1).offset("threshold", 2),
        ),
        ("get mac address", status().range("macAddress", 1, 6)),
        (
            "get link state",
            status().offset("linkState", 1).offset("linkSpeed", 2),
        ),
        ("reset", status()),
        ("get result", status().offset("result", 1)),
    ])
}

/// A parsed mailbox read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusResponse {
    /// Command name.
    pub command: String,
    /// Bytes read, as received.
    pub raw: RawResponse,
    /// Decoded result code, when the layout carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BusResultCode>,
    /// Fields extracted by the command's layout.
    pub fields: FieldMap,
}

impl BusResponse {
    /// Look up an extracted field.
    pub fn field(&self, name: &str) -> CodecResult<&FieldValue> {
        self.fields.get(name)
    }
}

/// Builds mailbox invocations and parses their reads.
#[derive(Debug, Clone, Copy)]
pub struct BusCodec<'a> {
    catalog: &'a BusCatalog,
    layouts: &'a LayoutTable,
    mode: ExtractMode,
    slave_addr: Option<u8>,
}

impl<'a> BusCodec<'a> {
    /// Create a codec over a catalog and its layouts, in strict mode.
    pub fn new(catalog: &'a BusCatalog, layouts: &'a LayoutTable) -> Self {
        BusCodec {
            catalog,
            layouts,
            mode: ExtractMode::Strict,
            slave_addr: None,
        }
    }

    /// Address every transaction to `slave_addr` instead of its catalog address.
    pub fn with_slave(mut self, slave_addr: u8) -> Self {
        self.slave_addr = Some(slave_addr);
        self
    }

    /// Set the extraction mode.
    pub fn with_mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }

    /// Look up a transaction by name.
    pub fn transaction(&self, name: &str) -> CodecResult<&'a BusTransaction> {
        self.catalog.resolve(name)
    }

    /// Executor arguments for a named command.
    pub fn invocation(&self, name: &str, bus: u8) -> CodecResult<Vec<String>> {
        let transaction = self.transaction(name)?;
        match self.slave_addr {
            Some(addr) => transaction.clone().slave(addr).invocation(bus),
            None => transaction.invocation(bus),
        }
    }

    /// Parse the bytes read back for a named command.
    pub fn parse(&self, name: &str, raw: &RawResponse) -> CodecResult<BusResponse> {
        let transaction = self.transaction(name)?;
        transaction.validate()?;
        let expected = transaction.read_len as usize;
        if raw.len() < expected {
            return Err(CodecError::TruncatedResponse {
                expected,
                actual: raw.len(),
            });
        }

        let layout = self.layouts.get(name);
        let status = match (layout, raw.tokens().first()) {
            (Some(layout), Some(token)) if reports_status(layout) => Some(decode_status(token)?),
            _ => None,
        };
        let fields = match layout {
            Some(layout) => extract_fields(raw.tokens(), layout, self.mode)?,
            None => FieldMap::default(),
        };

        Ok(BusResponse {
            command: name.to_string(),
            raw: raw.clone(),
            status,
            fields,
        })
    }
}

impl Default for BusCodec<'static> {
    fn default() -> Self {
        BusCodec::new(BusCatalog::builtin(), BusCatalog::builtin_layouts())
    }
}

fn reports_status(layout: &ResponseLayout) -> bool {
    layout
        .fields()
        .first()
        .map(|f| f.name == STATUS_FIELD && f.at == FieldLayout::Offset(0))
        .unwrap_or(false)
}

fn decode_status(token: &str) -> CodecResult<BusResultCode> {
    let code = parse_token(STATUS_FIELD, token)?;
    let code = u8::try_from(code).map_err(|_| {
        CodecError::validation(STATUS_FIELD, format!("'{}' is wider than one byte", token))
    })?;
    Ok(BusResultCode::from(code))
}

/// Parse a mailbox read with the built-in tables in strict mode.
pub fn parse_bus_response(name: &str, raw: &RawResponse) -> CodecResult<BusResponse> {
    BusCodec::default().parse(name, raw)
}

/// The first non-empty line of bus tool output.
pub fn first_output_line(lines: &[String]) -> CodecResult<RawResponse> {
    lines
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| RawResponse::from_line(l))
        .ok_or_else(|| CodecError::MissingResponse {
            marker: BUS_READ_LINE.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_transfer_tokens() {
        let codec = BusCodec::default();
        let tx = codec.transaction("get temperature").unwrap();
        assert_eq!(
            tx.tokens(1).unwrap(),
            vec!["1", "w2@0x32", "0x04", "0x00", "r3"]
        );
        assert_eq!(
            codec.invocation("get status", 3).unwrap(),
            vec!["-y", "3", "w1@0x32", "0x01", "r4"]
        );
    }

    #[test]
    fn test_invalid_transactions() {
        let err = BusTransaction::new(1, 0).tokens(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = BusTransaction::new(1, 1).slave(0x80).tokens(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_slave_override() {
        let codec = BusCodec::default().with_slave(0x1a);
        assert_eq!(
            codec.invocation("get status", 2).unwrap(),
            vec!["-y", "2", "w1@0x1a", "0x01", "r4"]
        );
        // catalog entry keeps its own address
        assert_eq!(codec.transaction("get status").unwrap().slave_addr, 0x32);

        let err = BusCodec::default()
            .with_slave(0x80)
            .invocation("get status", 2)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_every_transaction_has_a_fitting_layout() {
        let layouts = BusCatalog::builtin_layouts();
        for (name, tx) in BusCatalog::builtin().iter() {
            let layout = layouts.layout(name).unwrap();
            assert!(
                layout.min_payload_tokens() <= tx.read_len as usize,
                "layout for {} reads past the transaction",
                name
            );
            assert!(reports_status(layout));
        }
        assert_eq!(BusCatalog::builtin().len(), layouts.len());
    }

    #[test]
    fn test_parse_status_read() {
        let raw = RawResponse::from_line("0x00 0x02 0x00 0x10");
        let response = parse_bus_response("get status", &raw).unwrap();
        assert_eq!(response.status, Some(BusResultCode::Success));
        assert_eq!(response.field("deviceState").unwrap().as_token(), Some("0x02"));
        assert_eq!(
            response.field("errorFlags").unwrap().as_tokens().unwrap(),
            &["0x00", "0x10"]
        );
    }

    #[test]
    fn test_parse_device_name() {
        let raw = RawResponse::from_line(
            "0x00 0x4e 0x49 0x43 0x2d 0x31 0x00 0x00 0x00 0x00 0x00 0x00 0x00 0x00 0x00 0x00 0x00",
        );
        let response = parse_bus_response("get device name", &raw).unwrap();
        assert_eq!(response.field("name").unwrap().as_text(), Some("NIC-1"));
    }

    #[test]
    fn test_result_codes() {
        let response = parse_bus_response("get result", &RawResponse::from_line("0x04 0x00")).unwrap();
        assert_eq!(response.status, Some(BusResultCode::Busy));

        let response = parse_bus_response("reset", &RawResponse::from_line("0x09")).unwrap();
        assert_eq!(response.status, Some(BusResultCode::Unknown(9)));
    }

    #[test]
    fn test_short_read() {
        let raw = RawResponse::from_line("0x00 0x01");
        let err = parse_bus_response("get mac address", &raw).unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedResponse {
                expected: 7,
                actual: 2
            }
        );
    }

    #[test]
    fn test_unknown_bus_command() {
        let err = parse_bus_response("self destruct", &RawResponse::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_first_output_line() {
        let lines = vec![String::new(), "  ".into(), "0x00 0x01".into()];
        assert_eq!(first_output_line(&lines).unwrap().len(), 2);

        let err = first_output_line(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingResponse);
    }
}
