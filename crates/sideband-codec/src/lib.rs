//! Sideband Management Command Codec
//!
//! This crate turns symbolic management commands into the token sequences a
//! sideband transport tool expects, and turns the tool's textual responses
//! back into structured fields. It never touches hardware: the tool itself
//! sits behind the [`TransportExecutor`] trait.
//!
//! # Protocol Overview
//!
//! - **NCSI** (over MCTP): 16-token control packet header, payload, 4-token
//!   pad and 4-token checksum placeholder.
//! - **MCTP control** and **PLDM**: request byte (`0x80 | iid`), the PLDM type
//!   byte for PLDM, the command code, then the payload.
//! - **SMBus mailbox**: one write-then-read transfer per command, with its own
//!   opcode table and result codes.
//!
//! Every frame byte travels as a hex text token. Responses come back as one
//! line of hex tokens which is split into the family's fixed header, status
//! fields and payload; a per-command [`ResponseLayout`] names the payload
//! fields.
//!
//! # Data Flow
//!
//! ```text
//! name ─► CommandCatalog ─► CommandFields ─► build_frame ─► TransportArgs
//!                                                              │
//! Response ◄─ extract_fields ◄─ ResponseParser ◄─ RawResponse ◄┘ executor
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sideband_codec::{CommandCatalog, CommandFields, build_frame};
//!
//! let defaults = CommandFields { header_rev: 1, ..Default::default() };
//! let def = CommandCatalog::builtin().definition("get version id", &defaults)?;
//! let tokens = build_frame(def.family, &def.fields)?.tokens();
//! ```

mod bus;
mod catalog;
mod constants;
mod error;
mod extract;
mod family;
mod frame;
mod layout;
mod response;
mod session;
mod status;
mod token;
mod transport;

pub use bus::*;
pub use catalog::*;
pub use constants::*;
pub use error::*;
pub use extract::*;
pub use family::*;
pub use frame::*;
pub use layout::*;
pub use response::*;
pub use session::*;
pub use status::*;
pub use token::*;
pub use transport::*;
