use memchr::memmem;
use tracing::{debug, warn};

use crate::config::{Parameter, SigningConfig};

/// What scanning a message produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// The configured parse parameters with their discovered values.
    pub parse_parameters: Vec<Parameter>,
    /// Bytes following the last occurrence of the signature marker.
    pub old_signature: Vec<u8>,
    /// How many parse parameters received a value.
    pub filled: usize,
}

/// Walks a message line by line, filling parse parameters in order and
/// picking up the current signature.
///
/// Messages are treated as bytes. Only the markers come from the (UTF-8)
/// configuration.
pub struct MessageScanner<'a> {
    config: &'a SigningConfig,
}

/// Split a message into lines, each keeping its own terminator.
pub fn message_lines(message: &[u8]) -> impl Iterator<Item = &[u8]> {
    message.split_inclusive(|&b| b == b'\n')
}

fn strip_newline(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\n").unwrap_or(line)
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = strip_newline(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Everything after the first occurrence of `marker`, minus the line ending.
fn value_after<'l>(line: &'l [u8], marker: &str) -> Option<&'l [u8]> {
    memmem::find(line, marker.as_bytes()).map(|found| strip_terminator(&line[found + marker.len()..]))
}

/// The blank line separating headers from the body: a lone carriage return.
fn is_body_separator(line: &[u8]) -> bool {
    strip_newline(line) == b"\r"
}

impl<'a> MessageScanner<'a> {
    pub fn new(config: &'a SigningConfig) -> Self {
        Self { config }
    }

    pub fn scan(&self, message: &[u8]) -> ScanOutcome {
        let marker = self.config.signature_marker();
        let mut parameters = self.config.parse_parameters().to_vec();
        let mut old_signature = Vec::new();
        let mut cursor = 0;

        let mut lines = message_lines(message);
        while let Some(line) = lines.next() {
            if let Some(signature) = value_after(line, marker) {
                old_signature = signature.to_vec();
            }

            // Bounds check before touching the parameter at the cursor.
            let Some(parameter) = parameters.get_mut(cursor) else {
                continue;
            };

            if parameter.is_body_sentinel() {
                if is_body_separator(line) {
                    let body: Vec<&[u8]> = lines.by_ref().map(strip_newline).collect();
                    parameter.value = body.concat();
                    debug!(bytes = parameter.value.len(), "collected message body");
                    cursor += 1;
                    break;
                }
            } else if let Some(value) = value_after(line, &parameter.identifier) {
                parameter.value = value.to_vec();
                debug!(marker = %parameter.identifier, "matched parse parameter");
                cursor += 1;
            }
        }

        if cursor < parameters.len() {
            let unfilled: Vec<&str> = parameters[cursor..]
                .iter()
                .map(|p| p.identifier.as_str())
                .collect();
            warn!(?unfilled, "message ended before every parse parameter matched; using empty values");
        }
        if old_signature.is_empty() {
            warn!(marker, "no signature found in message");
        }

        ScanOutcome {
            parse_parameters: parameters,
            old_signature,
            filled: cursor,
        }
    }
}
