//! `sideband` - send NCSI, MCTP, PLDM and SMBus mailbox commands through
//! external transport tools.
//!
//! Usage:
//!   sideband run "get version id"
//!   sideband --bus 3 --slave-addr 0 run "get link status"
//!   sideband raw --msg-type PLDM --iid 1 --command 0x02 --layout "get tid"
//!   sideband bus "get temperature"
//!   sideband --slave-addr 26 bus "get status"
//!   sideband frame "select package"
//!   sideband list --family MCTP
//!   sideband dump --format yaml

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sideband_codec::{
    build_frame, BusCatalog, BusCodec, BusSession, CommandCatalog, LayoutTable, MessageType, Session,
};
use sideband_runner::{
    init_logging, Overrides, ProcessExecutor, RunnerConfig, RunnerError, RunnerResult,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

// ============================================================================
// CLI Definitions
// ============================================================================

/// Sideband management command runner.
#[derive(Parser)]
#[command(name = "sideband", version, about)]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long)]
    verbose: bool,

    /// Bus number.
    #[arg(long)]
    bus: Option<u8>,

    /// Destination endpoint id.
    #[arg(long)]
    dst_eid: Option<u8>,

    /// Slave address: passed with -s to the MCTP tool (0 omits it), and used
    /// as the mailbox address for `bus` commands.
    #[arg(long)]
    slave_addr: Option<u8>,

    /// Management controller id.
    #[arg(long)]
    mc_id: Option<u8>,

    /// NCSI header revision.
    #[arg(long, alias = "hrd-rv")]
    header_rev: Option<u8>,

    /// Do not ask the executor to decode the response.
    #[arg(long)]
    no_decode: bool,

    /// Clamp layout ranges to the payload instead of failing.
    #[arg(long)]
    lenient: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a catalog command.
    Run {
        /// Catalog name, e.g. "get version id".
        name: String,
    },

    /// Send a request built from explicit header fields.
    Raw {
        /// Message type.
        #[arg(long, default_value = "NCSI")]
        msg_type: MessageType,

        /// Instance id.
        #[arg(long)]
        iid: Option<u8>,

        /// Command code (hex).
        #[arg(long, value_parser = parse_hex_u8)]
        command: Option<u8>,

        /// Channel id.
        #[arg(long)]
        channel: Option<u8>,

        /// PLDM type.
        #[arg(long)]
        pldm_type: Option<u8>,

        /// Payload length; defaults to the payload size when a payload is given.
        #[arg(long)]
        pay_len: Option<u16>,

        /// Payload bytes as a hex string, e.g. 0000015700.
        #[arg(long)]
        payload: Option<String>,

        /// Layout to apply to the response.
        #[arg(long)]
        layout: Option<String>,
    },

    /// Run an SMBus mailbox command.
    Bus {
        /// Mailbox command name, e.g. "get temperature".
        name: String,
    },

    /// Print the request tokens for a catalog command without sending it.
    Frame {
        /// Catalog name.
        name: String,
    },

    /// List catalog commands.
    List {
        /// Only commands of this message type.
        #[arg(long)]
        family: Option<MessageType>,
    },

    /// Print the command and layout tables.
    Dump {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

/// Parse a hex string like "0x0a" or "0a" into a u8.
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex byte: {e}"))
}

/// Every persisted table, for `dump`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tables<'a> {
    commands: &'a CommandCatalog,
    layouts: &'a LayoutTable,
    bus_commands: &'a BusCatalog,
    bus_layouts: &'a LayoutTable,
}

// ============================================================================
// Commands
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> RunnerResult<()> {
    let mut config = RunnerConfig::load(cli.config.as_deref())?;
    config.apply(&Overrides {
        bus: cli.bus,
        dst_eid: cli.dst_eid,
        slave_addr: cli.slave_addr,
        mc_id: cli.mc_id,
        header_rev: cli.header_rev,
        no_decode: cli.no_decode,
        lenient: cli.lenient,
    });

    match cli.command {
        Command::Run { name } => {
            info!(command = %name, executor = %config.executor.mctp, "running catalog command");
            let response = session(&config).run_command(&name)?;
            print_json(&response)
        }
        Command::Raw {
            msg_type,
            iid,
            command,
            channel,
            pldm_type,
            pay_len,
            payload,
            layout,
        } => {
            let mut fields = config.defaults();
            fields.instance_id = iid.unwrap_or(fields.instance_id);
            fields.command_code = command.unwrap_or(fields.command_code);
            fields.channel_id = channel.unwrap_or(fields.channel_id);
            fields.pldm_type = pldm_type.unwrap_or(fields.pldm_type);
            if let Some(hex_text) = payload {
                let bytes = hex::decode(hex_text.trim_start_matches("0x"))
                    .map_err(|e| RunnerError::Config(format!("bad payload hex: {}", e)))?;
                fields.payload_len = u16::try_from(bytes.len())
                    .map_err(|_| RunnerError::Config("payload too long".into()))?;
                fields.payload = Some(bytes);
            }
            if let Some(len) = pay_len {
                fields.payload_len = len;
            }

            info!(family = %msg_type, "running raw request");
            let response = session(&config).run_fields(msg_type, fields, layout.as_deref())?;
            print_json(&response)
        }
        Command::Bus { name } => {
            info!(command = %name, executor = %config.executor.bus, "running bus command");
            let executor = ProcessExecutor::new(config.executor.bus.clone());
            let mut codec = BusCodec::default().with_mode(config.extract_mode);
            if let Some(addr) = cli.slave_addr {
                codec = codec.with_slave(addr);
            }
            let mut session = BusSession::new(executor, config.transport.bus).with_codec(codec);
            let response = session.run(&name)?;
            print_json(&response)
        }
        Command::Frame { name } => {
            let def = CommandCatalog::builtin().definition(&name, &config.defaults())?;
            let frame = build_frame(def.family, &def.fields)?;
            println!("{}", config.transport_args().invocation(&frame).join(" "));
            Ok(())
        }
        Command::List { family } => {
            for (name, entry) in CommandCatalog::builtin().entries() {
                if family.map_or(true, |f| f == entry.family) {
                    let flag = if entry.verified { "" } else { " (unverified)" };
                    println!("{:<6} {}{}", entry.family.as_str(), name, flag);
                }
            }
            if family.is_none() {
                for (name, _) in BusCatalog::builtin().iter() {
                    println!("{:<6} {}", "SMBUS", name);
                }
            }
            Ok(())
        }
        Command::Dump { format } => {
            let tables = Tables {
                commands: CommandCatalog::builtin(),
                layouts: LayoutTable::builtin(),
                bus_commands: BusCatalog::builtin(),
                bus_layouts: BusCatalog::builtin_layouts(),
            };
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
                Format::Yaml => print!("{}", serde_yaml::to_string(&tables)?),
            }
            Ok(())
        }
    }
}

fn session(config: &RunnerConfig) -> Session<'static, ProcessExecutor> {
    Session::new(
        ProcessExecutor::new(config.executor.mctp.clone()),
        config.transport_args(),
        config.defaults(),
    )
    .with_extract_mode(config.extract_mode)
    .with_marker(config.marker.clone())
}

fn print_json<T: Serialize>(value: &T) -> RunnerResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
