use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::debug;

use crate::consts::LOG_HEADER_SIZE;
use crate::error::{Result, SonarError};
use crate::frame::{Frame, Length};
use crate::io::lowrance::{point_to_lowrance, LogHeader};

/// Channels that get a "last frame offset" slot in every record.
const TRACKED_CHANNELS: usize = 6;

/// Writes a Lowrance log at the raw byte level.
pub struct LogWriter<W: Write> {
    writer: W,
    header: LogHeader,
    position: u64,
    last_block_size: u16,
    last_channel_offsets: [u32; TRACKED_CHANNELS],
    frames_written: usize,
}

impl LogWriter<BufWriter<File>> {
    /// Create a new log file and write the header.
    pub fn create(path: &Path, header: &LogHeader) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> LogWriter<W> {
    pub fn new(mut writer: W, header: &LogHeader) -> Result<Self> {
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            header: *header,
            position: LOG_HEADER_SIZE as u64,
            last_block_size: 0,
            last_channel_offsets: [0; TRACKED_CHANNELS],
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let layout = self.header.version.layout();
        let packet = frame.sounded_data.as_bytes();
        let block_size = u16::try_from(layout.header_size + packet.len()).map_err(|_| {
            SonarError::InvalidInput(format!(
                "frame {} sounded data of {} bytes does not fit a {} record",
                frame.index,
                packet.len(),
                self.header.version
            ))
        })?;
        let (x, y) = point_to_lowrance(&frame.point)?;
        let frame_offset = u32::try_from(self.position).map_err(|_| {
            SonarError::InvalidInput(format!(
                "log exceeds 4 GiB at frame {}",
                frame.index
            ))
        })?;

        let channel = frame.channel.id() as usize;
        if channel < TRACKED_CHANNELS {
            self.last_channel_offsets[channel] = frame_offset;
        }

        let mut head = vec![0u8; layout.header_size];
        let put_feet = |buf: &mut [u8], offset: usize, length: Length| {
            LittleEndian::write_f32(&mut buf[offset..], length.feet() as f32);
        };

        LittleEndian::write_u32(&mut head[layout.frame_offset..], frame_offset);
        for (slot, offset) in self.last_channel_offsets.iter().enumerate() {
            LittleEndian::write_u32(&mut head[layout.last_channel_offsets + slot * 4..], *offset);
        }
        LittleEndian::write_u16(&mut head[layout.block_size..], block_size);
        LittleEndian::write_u16(&mut head[layout.last_block_size..], self.last_block_size);
        LittleEndian::write_u16(&mut head[layout.channel..], frame.channel.id());
        if layout.packet_size_is_u32 {
            LittleEndian::write_u32(&mut head[layout.packet_size..], packet.len() as u32);
        } else {
            LittleEndian::write_u16(&mut head[layout.packet_size..], packet.len() as u16);
        }
        LittleEndian::write_u32(&mut head[layout.frame_index..], frame.index);
        put_feet(&mut head, layout.upper_limit, frame.upper_limit);
        put_feet(&mut head, layout.lower_limit, frame.lower_limit);
        // Frames without a known frequency keep the byte zeroed.
        head[layout.frequency] = frame.frequency.map_or(0, |f| f.code());

        let t = &frame.telemetry;
        LittleEndian::write_u32(&mut head[layout.unix_time..], t.unix_time);
        put_feet(&mut head, layout.water_depth, frame.depth);
        put_feet(&mut head, layout.keel_depth, t.keel_depth);
        LittleEndian::write_f32(&mut head[layout.speed_gps..], t.speed_gps_knots);
        LittleEndian::write_f32(&mut head[layout.temperature..], t.water_temperature_c);

        LittleEndian::write_i32(&mut head[layout.longitude..], x);
        LittleEndian::write_i32(&mut head[layout.latitude..], y);

        LittleEndian::write_f32(&mut head[layout.water_speed..], t.water_speed_knots);
        LittleEndian::write_f32(&mut head[layout.course..], t.course_rad);
        put_feet(&mut head, layout.altitude, t.altitude);
        LittleEndian::write_f32(&mut head[layout.heading..], t.heading_rad);
        LittleEndian::write_u16(&mut head[layout.flags..], t.flags);
        LittleEndian::write_u32(&mut head[layout.time_offset..], t.time_offset_ms);

        self.writer.write_all(&head)?;
        self.writer.write_all(packet)?;

        self.position += block_size as u64;
        self.last_block_size = block_size;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Flush and return the underlying writer.
    pub fn finalize(mut self) -> Result<W> {
        self.writer.flush()?;
        debug!(frames = self.frames_written, bytes = self.position, "Log written");
        Ok(self.writer)
    }
}

fn write_header(w: &mut impl Write, header: &LogHeader) -> Result<()> {
    w.write_u16::<LittleEndian>(header.version.code())?;
    w.write_u16::<LittleEndian>(header.hardware_version)?;
    w.write_u16::<LittleEndian>(header.block_size)?;
    // Reserved
    w.write_u16::<LittleEndian>(0)?;
    Ok(())
}

/// Write `frames` as a complete log file.
pub fn write_log(path: &Path, header: &LogHeader, frames: &[Frame]) -> Result<()> {
    let mut writer = LogWriter::create(path, header)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Encode `frames` as an in-memory log.
pub fn encode_log(header: &LogHeader, frames: &[Frame]) -> Result<Vec<u8>> {
    let mut writer = LogWriter::new(Vec::new(), header)?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    writer.finalize()
}
