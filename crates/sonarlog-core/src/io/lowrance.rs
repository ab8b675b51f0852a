use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{
    LOG_HEADER_SIZE, LOWRANCE_EARTH_RADIUS_M, SL2_FRAME_HEADER_SIZE, SL3_FRAME_HEADER_SIZE,
};
use crate::error::{Result, SonarError};
use crate::frame::{
    Channel, CoordinatePoint, Frame, FrameTelemetry, Frequency, Length, LogData, SoundedData,
};

/// Container version stored in the first header word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileVersion {
    Sl2,
    Sl3,
}

impl FileVersion {
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            2 => Ok(Self::Sl2),
            3 => Ok(Self::Sl3),
            other => Err(SonarError::UnsupportedVersion(other)),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::Sl2 => 2,
            Self::Sl3 => 3,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Sl2 => "sl2",
            Self::Sl3 => "sl3",
        }
    }

    /// Bytes before the sounded data in every frame record.
    pub fn frame_header_size(self) -> usize {
        self.layout().header_size
    }

    pub(crate) fn layout(self) -> &'static FrameLayout {
        match self {
            Self::Sl2 => &SL2_LAYOUT,
            Self::Sl3 => &SL3_LAYOUT,
        }
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sl2 => write!(f, "SL2"),
            Self::Sl3 => write!(f, "SL3"),
        }
    }
}

/// 8-byte file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogHeader {
    pub version: FileVersion,
    pub hardware_version: u16,
    pub block_size: u16,
}

impl LogHeader {
    /// Header written when the input log has a different version.
    pub fn canonical(version: FileVersion) -> Self {
        match version {
            FileVersion::Sl2 => Self {
                version,
                hardware_version: 0,
                block_size: 3200,
            },
            FileVersion::Sl3 => Self {
                version,
                hardware_version: 1,
                block_size: 3200,
            },
        }
    }

    /// Reuse `self` when it already describes `version`.
    pub fn for_output(&self, version: FileVersion) -> Self {
        if self.version == version {
            *self
        } else {
            Self::canonical(version)
        }
    }
}

/// Byte offsets of the fields inside a frame record.
pub(crate) struct FrameLayout {
    pub header_size: usize,
    pub frame_offset: usize,
    pub last_channel_offsets: usize,
    pub block_size: usize,
    pub last_block_size: usize,
    pub channel: usize,
    pub packet_size: usize,
    pub packet_size_is_u32: bool,
    pub frame_index: usize,
    pub upper_limit: usize,
    pub lower_limit: usize,
    pub frequency: usize,
    pub unix_time: usize,
    pub water_depth: usize,
    pub keel_depth: usize,
    pub speed_gps: usize,
    pub temperature: usize,
    pub longitude: usize,
    pub latitude: usize,
    pub water_speed: usize,
    pub course: usize,
    pub altitude: usize,
    pub heading: usize,
    pub flags: usize,
    pub time_offset: usize,
}

static SL2_LAYOUT: FrameLayout = FrameLayout {
    header_size: SL2_FRAME_HEADER_SIZE,
    frame_offset: 0,
    last_channel_offsets: 4,
    block_size: 28,
    last_block_size: 30,
    channel: 32,
    packet_size: 34,
    packet_size_is_u32: false,
    frame_index: 36,
    upper_limit: 40,
    lower_limit: 44,
    frequency: 50,
    unix_time: 60,
    water_depth: 64,
    keel_depth: 68,
    speed_gps: 100,
    temperature: 104,
    longitude: 108,
    latitude: 112,
    water_speed: 116,
    course: 120,
    altitude: 124,
    heading: 128,
    flags: 132,
    time_offset: 140,
};

static SL3_LAYOUT: FrameLayout = FrameLayout {
    header_size: SL3_FRAME_HEADER_SIZE,
    frame_offset: 0,
    last_channel_offsets: 120,
    block_size: 8,
    last_block_size: 10,
    channel: 12,
    packet_size: 44,
    packet_size_is_u32: true,
    frame_index: 16,
    upper_limit: 20,
    lower_limit: 24,
    frequency: 52,
    unix_time: 56,
    water_depth: 48,
    keel_depth: 60,
    speed_gps: 84,
    temperature: 88,
    longitude: 92,
    latitude: 96,
    water_speed: 100,
    course: 104,
    altitude: 108,
    heading: 112,
    flags: 116,
    time_offset: 40,
};

/// Fields needed to walk from one record to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordPrefix {
    pub block_size: usize,
    pub packet_size: usize,
    pub channel: Channel,
    pub frame_index: u32,
}

impl RecordPrefix {
    /// Bytes from the start of this record to the start of the next one.
    ///
    /// Normally `block_size`; a record whose sounded data runs past its
    /// declared block is walked over in full.
    pub fn record_len(&self, header_size: usize) -> usize {
        self.block_size.max(header_size + self.packet_size)
    }
}

impl FrameLayout {
    /// Decode the walking fields from a record's fixed header.
    pub(crate) fn prefix(&self, head: &[u8]) -> Result<RecordPrefix> {
        debug_assert!(head.len() >= self.header_size);
        let block_size = LittleEndian::read_u16(&head[self.block_size..]) as usize;
        let packet_size = if self.packet_size_is_u32 {
            LittleEndian::read_u32(&head[self.packet_size..]) as usize
        } else {
            LittleEndian::read_u16(&head[self.packet_size..]) as usize
        };
        if block_size < self.header_size {
            return Err(SonarError::InvalidLog(format!(
                "frame block size {} smaller than frame header {}",
                block_size, self.header_size
            )));
        }
        Ok(RecordPrefix {
            block_size,
            packet_size,
            channel: Channel::from(LittleEndian::read_u16(&head[self.channel..])),
            frame_index: LittleEndian::read_u32(&head[self.frame_index..]),
        })
    }
}

/// Lowrance spherical-Mercator integers to degrees.
pub fn point_from_lowrance(x: i32, y: i32) -> CoordinatePoint {
    let longitude = (x as f64 / LOWRANCE_EARTH_RADIUS_M).to_degrees();
    let latitude =
        (2.0 * (y as f64 / LOWRANCE_EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    CoordinatePoint::new(latitude, longitude)
}

/// Degrees to Lowrance spherical-Mercator integers `(x, y)`.
///
/// The poles have no Mercator image, so latitude must lie strictly inside
/// (-90, 90) and longitude inside [-180, 180].
pub fn point_to_lowrance(point: &CoordinatePoint) -> Result<(i32, i32)> {
    let in_range = point.latitude > -90.0
        && point.latitude < 90.0
        && (-180.0..=180.0).contains(&point.longitude);
    if !in_range {
        return Err(SonarError::InvalidInput(format!(
            "coordinate {point} cannot be stored in a Lowrance log"
        )));
    }
    let x = point.longitude.to_radians() * LOWRANCE_EARTH_RADIUS_M;
    let y = (FRAC_PI_4 + point.latitude.to_radians() / 2.0).tan().ln() * LOWRANCE_EARTH_RADIUS_M;
    Ok((x.round() as i32, y.round() as i32))
}

pub fn parse_header(buf: &[u8]) -> Result<LogHeader> {
    if buf.len() < LOG_HEADER_SIZE {
        return Err(SonarError::InvalidLog("file too small for log header".into()));
    }
    let mut cursor = Cursor::new(buf);
    let version = FileVersion::from_code(cursor.read_u16::<LittleEndian>()?)?;
    let hardware_version = cursor.read_u16::<LittleEndian>()?;
    let block_size = cursor.read_u16::<LittleEndian>()?;
    Ok(LogHeader {
        version,
        hardware_version,
        block_size,
    })
}

fn feet_at(record: &[u8], offset: usize) -> Length {
    Length::from_feet(LittleEndian::read_f32(&record[offset..]) as f64)
}

fn decode_frame(layout: &FrameLayout, prefix: &RecordPrefix, record: &[u8]) -> Frame {
    let f32_at = |offset: usize| LittleEndian::read_f32(&record[offset..]);

    let x = LittleEndian::read_i32(&record[layout.longitude..]);
    let y = LittleEndian::read_i32(&record[layout.latitude..]);
    let data_start = layout.header_size;
    let data_end = data_start + prefix.packet_size;

    Frame {
        channel: prefix.channel,
        index: prefix.frame_index,
        point: point_from_lowrance(x, y),
        depth: feet_at(record, layout.water_depth),
        frequency: Frequency::from_code(record[layout.frequency]),
        upper_limit: feet_at(record, layout.upper_limit),
        lower_limit: feet_at(record, layout.lower_limit),
        telemetry: FrameTelemetry {
            time_offset_ms: LittleEndian::read_u32(&record[layout.time_offset..]),
            unix_time: LittleEndian::read_u32(&record[layout.unix_time..]),
            keel_depth: feet_at(record, layout.keel_depth),
            speed_gps_knots: f32_at(layout.speed_gps),
            water_speed_knots: f32_at(layout.water_speed),
            water_temperature_c: f32_at(layout.temperature),
            course_rad: f32_at(layout.course),
            heading_rad: f32_at(layout.heading),
            altitude: feet_at(record, layout.altitude),
            flags: LittleEndian::read_u16(&record[layout.flags..]),
        },
        sounded_data: SoundedData::new(record[data_start..data_end].to_vec()),
    }
}

/// Iterator over the frame records that follow the file header.
pub struct FrameRecords<'a> {
    buf: &'a [u8],
    pos: usize,
    version: FileVersion,
}

impl<'a> FrameRecords<'a> {
    fn new(buf: &'a [u8], version: FileVersion) -> Self {
        Self {
            buf,
            pos: LOG_HEADER_SIZE,
            version,
        }
    }
}

impl Iterator for FrameRecords<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let layout = self.version.layout();
        let remaining = self.buf.len().saturating_sub(self.pos);
        if remaining == 0 {
            return None;
        }
        if remaining < layout.header_size {
            warn!(offset = self.pos, remaining, "Dropping trailing partial frame header");
            self.pos = self.buf.len();
            return None;
        }

        let record = &self.buf[self.pos..];
        let prefix = match layout.prefix(record) {
            Ok(p) => p,
            Err(e) => {
                self.pos = self.buf.len();
                return Some(Err(e));
            }
        };

        let needed = layout.header_size + prefix.packet_size;
        if needed > remaining {
            warn!(
                offset = self.pos,
                needed, remaining, "Dropping trailing partial frame"
            );
            self.pos = self.buf.len();
            return None;
        }

        let frame = decode_frame(layout, &prefix, &record[..needed]);
        self.pos += prefix.record_len(layout.header_size);
        Some(Ok(frame))
    }
}

/// Memory-mapped Lowrance log reader.
pub struct LogReader {
    mmap: Mmap,
    pub header: LogHeader,
}

impl LogReader {
    /// Open a log file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let header = parse_header(&mmap)?;
        debug!(path = %path.display(), version = %header.version, "Opened log");
        Ok(Self { mmap, header })
    }

    pub fn frames(&self) -> FrameRecords<'_> {
        FrameRecords::new(&self.mmap, self.header.version)
    }

    pub fn read_all(&self) -> Result<LogData> {
        Ok(LogData {
            header: self.header,
            frames: self.frames().collect::<Result<_>>()?,
        })
    }
}

/// Read a whole log file into memory.
pub fn read_log(path: &Path) -> Result<LogData> {
    LogReader::open(path)?.read_all()
}

/// Parse a log already held in memory.
pub fn parse_log(bytes: &[u8]) -> Result<LogData> {
    let header = parse_header(bytes)?;
    Ok(LogData {
        header,
        frames: FrameRecords::new(bytes, header.version).collect::<Result<_>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowrance_coordinates_round_trip() {
        let p = CoordinatePoint::new(55.751244, 37.618423);
        let (x, y) = point_to_lowrance(&p).unwrap();
        let back = point_from_lowrance(x, y);
        assert!((back.latitude - p.latitude).abs() < 1e-5);
        assert!((back.longitude - p.longitude).abs() < 1e-5);
    }

    #[test]
    fn slg_header_is_unsupported() {
        let buf = [1u8, 0, 0, 0, 0, 4, 0, 0];
        assert!(matches!(
            parse_header(&buf),
            Err(SonarError::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn output_header_reuses_same_version() {
        let header = LogHeader {
            version: FileVersion::Sl2,
            hardware_version: 7,
            block_size: 1970,
        };
        assert_eq!(header.for_output(FileVersion::Sl2), header);
        assert_eq!(
            header.for_output(FileVersion::Sl3),
            LogHeader::canonical(FileVersion::Sl3)
        );
    }
}
