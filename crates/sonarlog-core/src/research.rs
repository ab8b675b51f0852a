//! Raw-byte exploration of undocumented frame fields.
//!
//! Reads every frame record of a log as a forward-only stream and shows the
//! same few bytes at a fixed record offset as several candidate types.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, warn};

use crate::consts::{LOG_HEADER_SIZE, RESEARCH_WIDTH};
use crate::error::{Result, SonarError};
use crate::frame::Channel;
use crate::io::lowrance::{parse_header, FileVersion};

/// One set of bytes read as every candidate type.
#[derive(Clone, Debug, PartialEq)]
pub struct ResearchValue {
    pub raw_bytes: [u8; RESEARCH_WIDTH],
    /// Printable ASCII, with `.` for anything else.
    pub as_string: String,
    /// Signed 16-bit integer from the first two bytes.
    pub short_a: i16,
    /// Signed 16-bit integer from the last two bytes.
    pub short_b: i16,
    pub as_i32: i32,
    pub as_f32: f32,
    pub frame_index: u32,
    pub channel: Channel,
}

impl ResearchValue {
    pub fn from_bytes(raw_bytes: [u8; RESEARCH_WIDTH], frame_index: u32, channel: Channel) -> Self {
        let as_string = raw_bytes
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        Self {
            raw_bytes,
            as_string,
            short_a: LittleEndian::read_i16(&raw_bytes[..2]),
            short_b: LittleEndian::read_i16(&raw_bytes[2..]),
            as_i32: LittleEndian::read_i32(&raw_bytes),
            as_f32: LittleEndian::read_f32(&raw_bytes),
            frame_index,
            channel,
        }
    }

    /// Bytes as dash-separated hex, e.g. `0A-FF-00-12`.
    pub fn hex(&self) -> String {
        self.raw_bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Bytes as comma-separated decimals.
    pub fn decimal(&self) -> String {
        self.raw_bytes
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A value together with the file offset of the record it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ResearchEntry {
    pub record_offset: u64,
    pub value: ResearchValue,
}

/// Lazy iterator of [`ResearchEntry`] over a forward-only byte source.
///
/// Yields one entry per frame record in file order; records too short to
/// hold `offset + 4` bytes are skipped. A source that ends in the middle of
/// a record yields a single [`SonarError::TruncatedSource`] and then stops;
/// everything yielded before it remains valid.
pub struct ValueResearch<R: Read> {
    source: R,
    version: FileVersion,
    offset: usize,
    pending_skip: usize,
    position: u64,
    done: bool,
}

impl<R: Read> ValueResearch<R> {
    /// `source` is positioned at the file header, which spans `header_len`
    /// bytes; `offset` is relative to the start of each frame record.
    pub fn new(source: R, header_len: usize, offset: usize, version: FileVersion) -> Self {
        Self {
            source,
            version,
            offset,
            pending_skip: header_len,
            position: 0,
            done: false,
        }
    }

    fn truncated(&mut self, needed: usize, available: usize) -> Option<Result<ResearchEntry>> {
        self.done = true;
        warn!(
            offset = self.position,
            needed, available, "Research source truncated"
        );
        Some(Err(SonarError::TruncatedSource {
            offset: self.position,
            needed,
            available,
        }))
    }

    fn fail(&mut self, err: SonarError) -> Option<Result<ResearchEntry>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<R: Read> Iterator for ValueResearch<R> {
    type Item = Result<ResearchEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.pending_skip > 0 {
            let wanted = self.pending_skip;
            let skipped = match io::copy(&mut (&mut self.source).take(wanted as u64), &mut io::sink()) {
                Ok(n) => n as usize,
                Err(e) => return self.fail(e.into()),
            };
            self.pending_skip = 0;
            self.position += skipped as u64;
            if skipped < wanted {
                return self.truncated(wanted, skipped);
            }
        }

        let layout = self.version.layout();
        loop {
            let mut record = vec![0u8; layout.header_size];
            let got = match read_up_to(&mut self.source, &mut record) {
                Ok(n) => n,
                Err(e) => return self.fail(e.into()),
            };
            if got == 0 {
                self.done = true;
                return None;
            }
            if got < layout.header_size {
                return self.truncated(layout.header_size, got);
            }

            let prefix = match layout.prefix(&record) {
                Ok(p) => p,
                Err(e) => return self.fail(e),
            };

            let record_len = prefix.record_len(layout.header_size);
            record.resize(record_len, 0);
            let rest = match read_up_to(&mut self.source, &mut record[layout.header_size..]) {
                Ok(n) => n,
                Err(e) => return self.fail(e.into()),
            };
            let available = layout.header_size + rest;
            if available < record_len {
                return self.truncated(record_len, available);
            }

            let record_offset = self.position;
            self.position += record_len as u64;

            // Records on other channels are often shorter than the offset.
            let needed = self.offset + RESEARCH_WIDTH;
            if needed > record_len {
                debug!(
                    offset = record_offset,
                    record_len,
                    channel = %prefix.channel,
                    "Record shorter than research offset, skipping"
                );
                continue;
            }

            let mut raw = [0u8; RESEARCH_WIDTH];
            raw.copy_from_slice(&record[self.offset..needed]);
            return Some(Ok(ResearchEntry {
                record_offset,
                value: ResearchValue::from_bytes(raw, prefix.frame_index, prefix.channel),
            }));
        }
    }
}

/// Fill `buf` as far as the source allows; returns the byte count read.
fn read_up_to<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Everything a research run produced, plus why it stopped early if it did.
#[derive(Debug, Default)]
pub struct ResearchOutcome {
    pub entries: Vec<ResearchEntry>,
    pub truncated: Option<SonarError>,
}

impl ResearchOutcome {
    pub fn collect<I: Iterator<Item = Result<ResearchEntry>>>(iter: I) -> Self {
        let mut outcome = Self::default();
        for item in iter {
            match item {
                Ok(entry) => outcome.entries.push(entry),
                Err(e) => {
                    outcome.truncated = Some(e);
                    break;
                }
            }
        }
        outcome
    }
}

/// Open `path` and research `offset` in every frame record.
///
/// Only an unreadable or unrecognised header is an error; a short file
/// gives partial results.
pub fn research_file(path: &Path, offset: usize) -> Result<ResearchOutcome> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut head = [0u8; LOG_HEADER_SIZE];
    reader.read_exact(&mut head)?;
    let header = parse_header(&head)?;
    reader.seek(SeekFrom::Start(0))?;

    debug!(path = %path.display(), offset, version = %header.version, "Researching values");
    let outcome =
        ResearchOutcome::collect(ValueResearch::new(reader, LOG_HEADER_SIZE, offset, header.version));
    Ok(outcome)
}
