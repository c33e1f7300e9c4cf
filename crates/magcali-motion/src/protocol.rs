//! Recorded sensor log format.
//!
//! One record per line: `<t_ms> <kind> <x> <y> <z>`, fields separated by
//! whitespace or commas. `kind` is `A`/`acc` or `M`/`mag`. Blank lines and
//! lines starting with `#` are ignored.

use crate::types::{SensorKind, SensorSample};
use glam::DVec3;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("Line is not valid UTF-8")]
    InvalidUtf8,
    #[error("Expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("Unknown sensor kind {0:?}")]
    UnknownKind(String),
    #[error("Invalid number {0:?}")]
    InvalidNumber(String),
}

/// A sample together with its offset from the start of the recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRecord {
    pub offset: Duration,
    pub sample: SensorSample,
}

/// Streaming parser for recorded logs.
///
/// Feed raw bytes via `push_data`, then drain records via `next_record`.
pub struct SampleLogParser {
    buffer: VecDeque<u8>,
}

impl SampleLogParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(4096),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Next complete record, or `None` until a full line is buffered.
    pub fn next_record(&mut self) -> Option<Result<LogRecord, ProtocolError>> {
        loop {
            let newline = self.buffer.iter().position(|&b| b == b'\n')?;
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(record) = parse_line(&line) {
                return Some(record);
            }
        }
    }

    /// Parse whatever is left once the input has ended (a last line without
    /// a trailing newline).
    pub fn finish(&mut self) -> Option<Result<LogRecord, ProtocolError>> {
        if let Some(record) = self.next_record() {
            return Some(record);
        }
        let rest: Vec<u8> = self.buffer.drain(..).collect();
        parse_line(&rest)
    }
}

impl Default for SampleLogParser {
    fn default() -> Self {
        Self::new()
    }
}

/// `None` for blank and comment lines.
fn parse_line(line: &[u8]) -> Option<Result<LogRecord, ProtocolError>> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(_) => return Some(Err(ProtocolError::InvalidUtf8)),
    };
    if text.is_empty() || text.starts_with('#') {
        return None;
    }
    Some(parse_fields(text))
}

fn parse_fields(text: &str) -> Result<LogRecord, ProtocolError> {
    let fields: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() != 5 {
        return Err(ProtocolError::FieldCount(fields.len()));
    }

    let number = |s: &str| -> Result<f64, ProtocolError> {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ProtocolError::InvalidNumber(s.to_string()))
    };

    let offset = Duration::try_from_secs_f64(number(fields[0])? / 1000.0)
        .map_err(|_| ProtocolError::InvalidNumber(fields[0].to_string()))?;

    let kind = match fields[1].to_ascii_lowercase().as_str() {
        "a" | "acc" | "accel" => SensorKind::Acceleration,
        "m" | "mag" => SensorKind::MagneticField,
        other => return Err(ProtocolError::UnknownKind(other.to_string())),
    };

    Ok(LogRecord {
        offset,
        sample: SensorSample {
            kind,
            value: DVec3::new(number(fields[2])?, number(fields[3])?, number(fields[4])?),
        },
    })
}
