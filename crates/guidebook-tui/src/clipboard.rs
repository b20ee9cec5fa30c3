//! Terminal clipboard access through OSC 52.
//!
//! The terminal emulator owns the system clipboard; we ask it to set the
//! selection by writing an escape sequence with a base64 payload. Terminals
//! that do not support OSC 52 silently ignore it.

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Escape sequence that sets the clipboard selection to `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

pub fn copy(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(osc52_sequence(text).as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("Hello"), "\x1b]52;c;SGVsbG8=\x07");
    }

    #[test]
    fn test_osc52_non_ascii() {
        let seq = osc52_sequence("passord-ø");
        assert!(seq.starts_with("\x1b]52;c;"));
        assert!(seq.ends_with('\x07'));
        assert!(!seq.contains('ø'));
    }
}
