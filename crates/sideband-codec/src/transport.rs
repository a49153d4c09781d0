//! Transport executor boundary and output framing.
//!
//! The codec never talks to hardware. It hands an argument list to a
//! [`TransportExecutor`] and reads back the executor's text output. For the
//! NCSI/MCTP tool the response is the first non-empty line after a line
//! containing the marker (`raw response` by default):
//!
//! ```text
//! tx: 00 01 00 0a 0a 00 00 00 ...
//! raw response:
//! 08 01 02 00 01 00 0a 8a 00 ...
//! ```

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::frame::Frame;
use crate::response::RawResponse;
use bytes::BytesMut;
use tracing::trace;

/// Initial capacity of the output buffer.
const OUTPUT_BUFFER_CAPACITY: usize = 1024;

/// What an executor run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorOutput {
    /// Standard output, split into lines.
    pub stdout: Vec<String>,
    /// Standard error text.
    pub stderr: String,
    /// Exit code, or `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ExecutorOutput {
    /// A successful run that printed `text`.
    pub fn from_stdout(text: &str) -> Self {
        ExecutorOutput {
            stdout: text.lines().map(str::to_string).collect(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Whether the executor exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Fail with a transport error unless the executor exited cleanly.
    pub fn ensure_success(&self) -> CodecResult<()> {
        if self.success() {
            return Ok(());
        }
        let status = match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            Err(CodecError::transport(format!("executor failed ({})", status)))
        } else {
            Err(CodecError::transport(format!(
                "executor failed ({}): {}",
                status, stderr
            )))
        }
    }
}

/// Runs one executor invocation.
///
/// Implementations own the program name; `args` are everything after it.
pub trait TransportExecutor {
    /// Run the executor with `args` and collect its output.
    fn execute(&mut self, args: &[String]) -> CodecResult<ExecutorOutput>;
}

impl<E: TransportExecutor + ?Sized> TransportExecutor for &mut E {
    fn execute(&mut self, args: &[String]) -> CodecResult<ExecutorOutput> {
        (**self).execute(args)
    }
}

/// Positional transport arguments of the NCSI/MCTP executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportArgs {
    /// Ask the executor to decode the response (`-d`).
    pub decode_response: bool,
    /// Bus slave address (`-s <addr>`); omitted when `None`.
    pub slave_addr: Option<u8>,
    /// Bus number.
    pub bus: u8,
    /// Destination endpoint id.
    pub dst_eid: u8,
}

impl Default for TransportArgs {
    fn default() -> Self {
        TransportArgs {
            decode_response: true,
            slave_addr: Some(55),
            bus: 1,
            dst_eid: 0,
        }
    }
}

impl TransportArgs {
    /// Assemble the executor arguments for a frame.
    ///
    /// `[-d] [-s <slave>] <bus> <dst_eid> <msg_type> <frame tokens...>`, with
    /// the transport values in decimal.
    pub fn invocation(&self, frame: &Frame) -> Vec<String> {
        let mut args = Vec::with_capacity(6 + frame.token_count());
        if self.decode_response {
            args.push(FLAG_DECODE_RESPONSE.to_string());
        }
        if let Some(addr) = self.slave_addr {
            args.push(FLAG_SLAVE_ADDR.to_string());
            args.push(addr.to_string());
        }
        args.push(self.bus.to_string());
        args.push(self.dst_eid.to_string());
        args.push(frame.family.code().to_string());
        args.extend(frame.tokens());
        args
    }
}

/// Find the response line following the marker line.
pub fn locate_raw_response(lines: &[String], marker: &str) -> CodecResult<RawResponse> {
    let missing = || CodecError::MissingResponse {
        marker: marker.to_string(),
    };
    let start = lines
        .iter()
        .position(|l| l.contains(marker))
        .ok_or_else(missing)?;
    let line = lines[start + 1..]
        .iter()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(missing)?;
    trace!(line = %line, "located raw response");
    Ok(RawResponse::from_line(line))
}

/// Incremental splitter for executor output.
///
/// Bytes arrive in arbitrary chunks; complete lines come out of
/// [`OutputCodec::decode_line`], and [`OutputCodec::decode_raw_response`]
/// yields the response line once the marker and the line after it have both
/// arrived.
#[derive(Debug)]
pub struct OutputCodec {
    buffer: BytesMut,
    marker: String,
    seen_marker: bool,
}

impl Default for OutputCodec {
    fn default() -> Self {
        Self::new(RAW_RESPONSE_MARKER)
    }
}

impl OutputCodec {
    /// Create a codec looking for `marker`.
    pub fn new(marker: &str) -> Self {
        OutputCodec {
            buffer: BytesMut::with_capacity(OUTPUT_BUFFER_CAPACITY),
            marker: marker.to_string(),
            seen_marker: false,
        }
    }

    /// Add received bytes to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next complete line, without its terminator.
    ///
    /// Empty lines are returned as empty strings.
    pub fn decode_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let line = self.buffer.split_to(end + 1);
        let mut line = &line[..end];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        Some(String::from_utf8_lossy(line).into_owned())
    }

    /// Take whatever is left as a final, unterminated line.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        let text = String::from_utf8_lossy(&rest);
        Some(text.trim_end_matches('\r').to_string())
    }

    /// Drain every complete line, then any unterminated tail.
    pub fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.decode_line() {
            lines.push(line);
        }
        lines.extend(self.finish());
        lines
    }

    /// Try to decode the raw response.
    ///
    /// Returns `None` until the marker line and a non-empty line after it
    /// have been received. Lines before the marker are discarded.
    pub fn decode_raw_response(&mut self) -> Option<RawResponse> {
        while let Some(line) = self.decode_line() {
            if !self.seen_marker {
                self.seen_marker = line.contains(&self.marker);
            } else if !line.trim().is_empty() {
                self.seen_marker = false;
                trace!(line = %line, "decoded raw response");
                return Some(RawResponse::from_line(&line));
            }
        }
        None
    }

    /// Decode the raw response once the output has ended.
    ///
    /// Complete lines are scanned first; an unterminated tail counts as the
    /// response line when the marker has already been seen.
    pub fn finish_raw_response(&mut self) -> Option<RawResponse> {
        if let Some(raw) = self.decode_raw_response() {
            return Some(raw);
        }
        let tail = self.finish()?;
        if !self.seen_marker || tail.trim().is_empty() {
            return None;
        }
        self.seen_marker = false;
        trace!(line = %tail, "decoded unterminated raw response");
        Some(RawResponse::from_line(&tail))
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer and marker state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.seen_marker = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CommandFields;
    use crate::error::ErrorKind;
    use crate::family::MessageType;
    use crate::frame::build_frame;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_invocation_grammar() {
        let frame = build_frame(MessageType::Ncsi, &CommandFields::default()).unwrap();
        let args = TransportArgs::default().invocation(&frame);
        assert_eq!(&args[..6], &["-d", "-s", "55", "1", "0", "2"]);
        assert_eq!(args.len(), 6 + 24);

        let transport = TransportArgs {
            decode_response: false,
            slave_addr: None,
            bus: 12,
            dst_eid: 8,
        };
        let frame = build_frame(MessageType::Pldm, &CommandFields::default()).unwrap();
        assert_eq!(
            transport.invocation(&frame),
            vec!["12", "8", "1", "0x80", "0x00", "0x00"]
        );
    }

    #[test]
    fn test_locate_raw_response() {
        let out = lines("tx: 00 01\nraw response:\n08 01 02\ndone");
        let raw = locate_raw_response(&out, RAW_RESPONSE_MARKER).unwrap();
        assert_eq!(raw.tokens(), &["08", "01", "02"]);

        let out = lines("tx: 00 01\nraw response:\n\n  08 01\n");
        assert_eq!(locate_raw_response(&out, RAW_RESPONSE_MARKER).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_marker() {
        let out = lines("tx: 00 01\ntimeout");
        let err = locate_raw_response(&out, RAW_RESPONSE_MARKER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingResponse);

        let out = lines("raw response:");
        assert!(locate_raw_response(&out, RAW_RESPONSE_MARKER).is_err());
    }

    #[test]
    fn test_ensure_success() {
        assert!(ExecutorOutput::from_stdout("ok").ensure_success().is_ok());

        let failed = ExecutorOutput {
            stderr: "no such device\n".into(),
            exit_code: Some(2),
            ..Default::default()
        };
        let err = failed.ensure_success().unwrap_err();
        assert_eq!(
            err,
            CodecError::Transport("executor failed (exit code 2): no such device".into())
        );
        assert!(ExecutorOutput::default().ensure_success().is_err());
    }

    #[test]
    fn test_output_codec_partial_chunks() {
        let mut codec = OutputCodec::default();
        codec.push(b"tx: 00 01\r\nraw resp");
        assert!(codec.decode_raw_response().is_none());

        codec.push(b"onse:\r\n08 01");
        assert!(codec.decode_raw_response().is_none());

        codec.push(b" 02\r\n");
        let raw = codec.decode_raw_response().unwrap();
        assert_eq!(raw.tokens(), &["08", "01", "02"]);
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_output_codec_unterminated_response() {
        let mut codec = OutputCodec::default();
        codec.push(b"raw response\n08 01 02");
        assert!(codec.decode_raw_response().is_none());

        let raw = codec.finish_raw_response().unwrap();
        assert_eq!(raw.tokens(), &["08", "01", "02"]);
        assert_eq!(codec.buffered_len(), 0);

        // a tail without a preceding marker is not a response
        codec.push(b"08 01 02");
        assert!(codec.finish_raw_response().is_none());
    }

    #[test]
    fn test_output_codec_lines() {
        let mut codec = OutputCodec::new("resp");
        codec.push(b"one\n\ntwo\r\nthree");
        assert_eq!(codec.drain_lines(), vec!["one", "", "two", "three"]);
        assert!(codec.finish().is_none());

        codec.push(b"leftover");
        codec.clear();
        assert_eq!(codec.buffered_len(), 0);
    }
}
