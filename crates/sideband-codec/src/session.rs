//! End-to-end request/response sessions over a [`TransportExecutor`].

use crate::bus::{first_output_line, BusCodec, BusResponse};
use crate::catalog::{CommandCatalog, CommandDefinition, CommandFields, CommandId};
use crate::constants::RAW_RESPONSE_MARKER;
use crate::error::CodecResult;
use crate::extract::ExtractMode;
use crate::family::MessageType;
use crate::frame::build_frame;
use crate::layout::LayoutTable;
use crate::response::{Response, ResponseParser};
use crate::transport::{locate_raw_response, TransportArgs, TransportExecutor};
use tracing::debug;

/// Drives NCSI, MCTP and PLDM commands through an executor.
///
/// Each call resolves the command, builds its frame, runs the executor once,
/// and parses the response. Nothing is retried.
pub struct Session<'a, E> {
    executor: E,
    transport: TransportArgs,
    defaults: CommandFields,
    catalog: &'a CommandCatalog,
    layouts: &'a LayoutTable,
    mode: ExtractMode,
    marker: String,
}

impl<E: TransportExecutor> Session<'static, E> {
    /// Create a session over the built-in catalog and layouts.
    pub fn new(executor: E, transport: TransportArgs, defaults: CommandFields) -> Self {
        Session {
            executor,
            transport,
            defaults,
            catalog: CommandCatalog::builtin(),
            layouts: LayoutTable::builtin(),
            mode: ExtractMode::Strict,
            marker: RAW_RESPONSE_MARKER.to_string(),
        }
    }
}

impl<'a, E: TransportExecutor> Session<'a, E> {
    /// Use a different catalog and layout table.
    pub fn with_tables<'b>(
        self,
        catalog: &'b CommandCatalog,
        layouts: &'b LayoutTable,
    ) -> Session<'b, E> {
        Session {
            executor: self.executor,
            transport: self.transport,
            defaults: self.defaults,
            catalog,
            layouts,
            mode: self.mode,
            marker: self.marker,
        }
    }

    /// Set the extraction mode.
    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the marker preceding the response line.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Run a catalog command.
    pub fn run_command(&mut self, name: &str) -> CodecResult<Response> {
        let definition = self.catalog.definition(name, &self.defaults)?;
        self.run_definition(&definition)
    }

    /// Run a catalog command by its stable id.
    pub fn run_id(&mut self, id: CommandId) -> CodecResult<Response> {
        let definition = self.catalog.definition_for(id, &self.defaults)?;
        self.run_definition(&definition)
    }

    /// Run a request built from explicit fields.
    ///
    /// `name` selects a response layout; it is not looked up in the catalog.
    pub fn run_fields(
        &mut self,
        family: MessageType,
        fields: CommandFields,
        name: Option<&str>,
    ) -> CodecResult<Response> {
        let mut definition = CommandDefinition::custom(family, fields)?;
        definition.name = name.map(str::to_string);
        self.run_definition(&definition)
    }

    /// Run a resolved definition.
    pub fn run_definition(&mut self, definition: &CommandDefinition) -> CodecResult<Response> {
        let frame = build_frame(definition.family, &definition.fields)?;
        let args = self.transport.invocation(&frame);
        debug!(
            command = definition.name.as_deref().unwrap_or("<custom>"),
            family = %definition.family,
            args = %args.join(" "),
            "invoking executor"
        );

        let output = self.executor.execute(&args)?;
        output.ensure_success()?;
        let raw = locate_raw_response(&output.stdout, &self.marker)?;

        ResponseParser::new(self.layouts)
            .with_mode(self.mode)
            .parse(definition.family, definition.name.as_deref(), &raw)
    }

    /// The caller defaults merged under every catalog command.
    pub fn defaults(&self) -> &CommandFields {
        &self.defaults
    }

    /// Get a reference to the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Consume the session and return the executor.
    pub fn into_executor(self) -> E {
        self.executor
    }
}

/// Drives SMBus mailbox commands through an executor.
pub struct BusSession<'a, E> {
    executor: E,
    bus: u8,
    codec: BusCodec<'a>,
}

impl<E: TransportExecutor> BusSession<'static, E> {
    /// Create a session over the built-in mailbox catalog.
    pub fn new(executor: E, bus: u8) -> Self {
        BusSession {
            executor,
            bus,
            codec: BusCodec::default(),
        }
    }
}

impl<'a, E: TransportExecutor> BusSession<'a, E> {
    /// Use a different codec.
    pub fn with_codec<'b>(self, codec: BusCodec<'b>) -> BusSession<'b, E> {
        BusSession {
            executor: self.executor,
            bus: self.bus,
            codec,
        }
    }

    /// Run a mailbox command.
    pub fn run(&mut self, name: &str) -> CodecResult<BusResponse> {
        let args = self.codec.invocation(name, self.bus)?;
        debug!(command = name, args = %args.join(" "), "invoking bus executor");

        let output = self.executor.execute(&args)?;
        output.ensure_success()?;
        let raw = first_output_line(&output.stdout)?;
        self.codec.parse(name, &raw)
    }

    /// Get a reference to the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }
}
