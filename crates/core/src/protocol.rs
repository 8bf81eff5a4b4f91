//! The worker stdout line protocol.
//!
//! The worker reports progress over its standard output as newline-delimited
//! text lines:
//!
//! ```text
//! PROGRESS:<integer 0-100>
//! STATUS:<free text>
//! OUTPUT:<file path>
//! ```
//!
//! Stream chunks arrive at arbitrary split points, so [`LineProtocolParser`]
//! keeps the trailing incomplete line in a carry-over buffer between chunks
//! and flushes it as a final line when the stream closes.

/// One classified line from the worker's stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Completion percentage, guaranteed to be within 0–100.
    Progress { percent: u8 },
    /// Free-text status message (may be empty).
    Status { message: String },
    /// Path to the finished video file.
    Output { path: String },
    /// A line matching none of the recognized prefixes. Diagnostic only;
    /// callers log and drop these.
    Unrecognized { line: String },
}

/// Classify one complete line.
///
/// Returns `None` for blank lines and for `PROGRESS:` lines whose payload is
/// non-numeric or outside 0–100 (malformed input is absorbed, never an
/// error). Prefixes are checked in fixed order; first match wins.
pub fn classify_line(line: &str) -> Option<ProtocolEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix("PROGRESS:") {
        return match rest.trim().parse::<i64>() {
            Ok(percent) if (0..=100).contains(&percent) => Some(ProtocolEvent::Progress {
                percent: percent as u8,
            }),
            _ => {
                tracing::debug!(line, "Dropping malformed progress line");
                None
            }
        };
    }

    if let Some(rest) = line.strip_prefix("STATUS:") {
        return Some(ProtocolEvent::Status {
            message: rest.trim().to_string(),
        });
    }

    if let Some(rest) = line.strip_prefix("OUTPUT:") {
        return Some(ProtocolEvent::Output {
            path: rest.trim().to_string(),
        });
    }

    Some(ProtocolEvent::Unrecognized {
        line: line.to_string(),
    })
}

/// Incremental parser turning raw stream chunks into [`ProtocolEvent`]s.
///
/// One parser instance per stream per job; not restartable. Emitted event
/// order equals the order lines appeared in the byte stream, and a line
/// fragmented across any number of chunks yields exactly one event. The
/// carry-over is kept as raw bytes and only complete lines are decoded, so
/// a multi-byte character split across chunks survives intact.
#[derive(Debug, Default)]
pub struct LineProtocolParser {
    /// Trailing bytes of the last chunk that did not end in a newline.
    carry: Vec<u8>,
}

impl LineProtocolParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk; returns events for every complete line it closed.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<ProtocolEvent> {
        self.carry.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=pos).collect();
            // Drop the trailing newline before classifying.
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            if let Some(event) = classify_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Signal end of stream. A non-empty carry-over is treated as a final
    /// complete line.
    pub fn finish(self) -> Option<ProtocolEvent> {
        if self.carry.is_empty() {
            None
        } else {
            classify_line(&String::from_utf8_lossy(&self.carry))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
