//! Interpretation of received payloads.
//!
//! The wire format is raw newline-terminated text. The only command is the
//! `close` sentinel, which asks the server to drop the sending connection;
//! everything else is logged and otherwise ignored.

use tracing::debug;

/// Payload that requests a disconnect, line ending excluded.
pub const CLOSE_SENTINEL: &[u8] = b"close";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Disconnect,
}

/// Classifies one received payload.
///
/// `payload` must be exactly the bytes the last `recv` returned. Trailing CR
/// and LF bytes are ignored; anything else, leading or trailing whitespace
/// included, makes it ordinary data.
pub fn interpret(payload: &[u8]) -> Verdict {
    let line = trim_line_ending(payload);

    debug!(
        bytes = payload.len(),
        payload = %String::from_utf8_lossy(line),
        "received"
    );

    if line == CLOSE_SENTINEL {
        Verdict::Disconnect
    } else {
        Verdict::Continue
    }
}

fn trim_line_ending(payload: &[u8]) -> &[u8] {
    let end = payload
        .iter()
        .rposition(|&byte| byte != b'\r' && byte != b'\n')
        .map_or(0, |last| last + 1);

    &payload[..end]
}
