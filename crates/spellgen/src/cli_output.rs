//! Centralised helpers for user-facing CLI output written to stderr.
//!
//! The whole interactive session (prompts, echoed metadata, warnings) lives on
//! stderr so stdout stays clean for shells that capture it.

use std::io::Write as _;

pub(crate) fn stderr_write(s: &str) {
    let mut stderr = std::io::stderr().lock();
    if stderr.write_all(s.as_bytes()).is_err() {
        return;
    }
    let _flush = stderr.flush();
}

pub(crate) fn stderr_writeln(s: &str) {
    let mut stderr = std::io::stderr().lock();
    if stderr.write_all(s.as_bytes()).is_err() {
        return;
    }
    if stderr.write_all(b"\n").is_err() {
        return;
    }
    let _flush = stderr.flush();
}

/// Echo an informational line (resolved addresses, token metadata, prices).
pub fn note(s: &str) {
    stderr_writeln(s);
}

/// Warn about a recoverable condition; the flow continues after this.
pub fn warn(msg: &str) {
    stderr_writeln(&format!("Warning: {msg}"));
}
