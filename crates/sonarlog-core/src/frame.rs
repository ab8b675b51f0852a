use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{EARTH_RADIUS_M, METERS_PER_FOOT};
use crate::io::lowrance::LogHeader;

/// Sonar beam / sensor a frame was recorded on.
///
/// The numeric id is what the log stores and what users type on the
/// command line, so it is the serialized form as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum Channel {
    Primary,
    Secondary,
    DownScan,
    SidescanLeft,
    SidescanRight,
    SidescanComposite,
    ThreeD,
    Other(u16),
}

impl Channel {
    pub fn id(self) -> u16 {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::DownScan => 2,
            Self::SidescanLeft => 3,
            Self::SidescanRight => 4,
            Self::SidescanComposite => 5,
            Self::ThreeD => 9,
            Self::Other(id) => id,
        }
    }
}

impl From<u16> for Channel {
    fn from(id: u16) -> Self {
        match id {
            0 => Self::Primary,
            1 => Self::Secondary,
            2 => Self::DownScan,
            3 => Self::SidescanLeft,
            4 => Self::SidescanRight,
            5 => Self::SidescanComposite,
            9 => Self::ThreeD,
            other => Self::Other(other),
        }
    }
}

impl From<Channel> for u16 {
    fn from(channel: Channel) -> Self {
        channel.id()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "Primary"),
            Self::Secondary => write!(f, "Secondary"),
            Self::DownScan => write!(f, "DownScan"),
            Self::SidescanLeft => write!(f, "SidescanLeft"),
            Self::SidescanRight => write!(f, "SidescanRight"),
            Self::SidescanComposite => write!(f, "SidescanComposite"),
            Self::ThreeD => write!(f, "ThreeD"),
            Self::Other(id) => write!(f, "Channel{id}"),
        }
    }
}

/// Transducer operating frequency, as encoded by the one-byte log code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frequency {
    Khz200,
    Khz50,
    Khz83,
    Khz455,
    Khz800,
    Khz38,
    Khz28,
    Khz130To210,
    Khz90To150,
    Khz40To60,
    Khz25To45,
}

impl Frequency {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Khz200),
            1 => Some(Self::Khz50),
            2 => Some(Self::Khz83),
            3 => Some(Self::Khz455),
            4 => Some(Self::Khz800),
            5 => Some(Self::Khz38),
            6 => Some(Self::Khz28),
            7 => Some(Self::Khz130To210),
            8 => Some(Self::Khz90To150),
            9 => Some(Self::Khz40To60),
            10 => Some(Self::Khz25To45),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Khz200 => 0,
            Self::Khz50 => 1,
            Self::Khz83 => 2,
            Self::Khz455 => 3,
            Self::Khz800 => 4,
            Self::Khz38 => 5,
            Self::Khz28 => 6,
            Self::Khz130To210 => 7,
            Self::Khz90To150 => 8,
            Self::Khz40To60 => 9,
            Self::Khz25To45 => 10,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Khz200 => write!(f, "200 kHz"),
            Self::Khz50 => write!(f, "50 kHz"),
            Self::Khz83 => write!(f, "83 kHz"),
            Self::Khz455 => write!(f, "455 kHz"),
            Self::Khz800 => write!(f, "800 kHz"),
            Self::Khz38 => write!(f, "38 kHz"),
            Self::Khz28 => write!(f, "28 kHz"),
            Self::Khz130To210 => write!(f, "130-210 kHz"),
            Self::Khz90To150 => write!(f, "90-150 kHz"),
            Self::Khz40To60 => write!(f, "40-60 kHz"),
            Self::Khz25To45 => write!(f, "25-45 kHz"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Meter,
    Kilometer,
    Inch,
    Foot,
    Yard,
    NauticalMile,
}

impl LengthUnit {
    fn meters_per_unit(self) -> f64 {
        match self {
            Self::Millimeter => 0.001,
            Self::Centimeter => 0.01,
            Self::Meter => 1.0,
            Self::Kilometer => 1000.0,
            Self::Inch => METERS_PER_FOOT / 12.0,
            Self::Foot => METERS_PER_FOOT,
            Self::Yard => METERS_PER_FOOT * 3.0,
            Self::NauticalMile => 1852.0,
        }
    }
}

/// A physical length, stored canonically in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Length {
    meters: f64,
}

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self {
            meters: value * unit.meters_per_unit(),
        }
    }

    pub fn from_meters(meters: f64) -> Self {
        Self { meters }
    }

    pub fn from_feet(feet: f64) -> Self {
        Self::new(feet, LengthUnit::Foot)
    }

    pub fn meters(self) -> f64 {
        self.meters
    }

    pub fn feet(self) -> f64 {
        self.to(LengthUnit::Foot)
    }

    pub fn to(self, unit: LengthUnit) -> f64 {
        self.meters / unit.meters_per_unit()
    }
}

impl std::ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length::from_meters(self.meters + rhs.meters)
    }
}

impl std::ops::Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length::from_meters(self.meters - rhs.meters)
    }
}

/// Geographic position in signed decimal degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoordinatePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl CoordinatePoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when latitude is in [-90, 90] and longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle (haversine) distance in meters.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let sin_dlat_half = (dlat / 2.0).sin();
        let sin_dlon_half = (dlon / 2.0).sin();
        let a = sin_dlat_half.mul_add(
            sin_dlat_half,
            lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half,
        );
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_M * c
    }

    /// Hashable identity of the exact coordinate; `-0.0` and `0.0` collapse.
    pub fn key(&self) -> PointKey {
        PointKey((self.latitude + 0.0).to_bits(), (self.longitude + 0.0).to_bits())
    }
}

impl fmt::Display for CoordinatePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointKey(u64, u64);

/// Raw amplitude-over-range trace; index 0 is the transducer end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoundedData(Vec<u8>);

impl SoundedData {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Reverse the sample order in place.
    pub fn flip(&mut self) {
        self.0.reverse();
    }
}

impl From<Vec<u8>> for SoundedData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Navigation values carried through the pipeline untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTelemetry {
    pub time_offset_ms: u32,
    pub unix_time: u32,
    pub keel_depth: Length,
    pub speed_gps_knots: f32,
    pub water_speed_knots: f32,
    pub water_temperature_c: f32,
    pub course_rad: f32,
    pub heading_rad: f32,
    pub altitude: Length,
    pub flags: u16,
}

/// One sonar ping.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub channel: Channel,
    /// Ordinal assigned by the recorder; only unique per capture stream.
    pub index: u32,
    pub point: CoordinatePoint,
    pub depth: Length,
    pub frequency: Option<Frequency>,
    /// Range shown at the first sample of `sounded_data`.
    pub upper_limit: Length,
    /// Range shown at the last sample of `sounded_data`.
    pub lower_limit: Length,
    pub telemetry: FrameTelemetry,
    pub sounded_data: SoundedData,
}

impl Frame {
    pub fn new(channel: Channel, index: u32, point: CoordinatePoint, depth: Length) -> Self {
        Self {
            channel,
            index,
            point,
            depth,
            frequency: None,
            upper_limit: Length::default(),
            lower_limit: Length::default(),
            telemetry: FrameTelemetry::default(),
            sounded_data: SoundedData::default(),
        }
    }

    pub fn depth_point(&self) -> DepthPoint {
        DepthPoint {
            point: self.point,
            depth: self.depth,
        }
    }
}

/// A frame reduced to its position and depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthPoint {
    pub point: CoordinatePoint,
    pub depth: Length,
}

/// A parsed log: header plus every frame in file order.
#[derive(Clone, Debug)]
pub struct LogData {
    pub header: LogHeader,
    pub frames: Vec<Frame>,
}

impl LogData {
    /// Unix time of the first frame that carries one.
    pub fn creation_time(&self) -> Option<u32> {
        self.frames
            .iter()
            .map(|f| f.telemetry.unix_time)
            .find(|&t| t != 0)
    }

    /// Per-channel statistics in order of first appearance.
    pub fn channel_summary(&self) -> Vec<ChannelSummary> {
        let mut order: Vec<Channel> = Vec::new();
        let mut by_channel: HashMap<Channel, ChannelSummary> = HashMap::new();

        for frame in &self.frames {
            by_channel
                .entry(frame.channel)
                .and_modify(|s| {
                    s.last_index = frame.index;
                    s.frame_count += 1;
                })
                .or_insert_with(|| {
                    order.push(frame.channel);
                    ChannelSummary {
                        channel: frame.channel,
                        frequency: frame.frequency,
                        first_index: frame.index,
                        last_index: frame.index,
                        frame_count: 1,
                    }
                });
        }

        order
            .into_iter()
            .filter_map(|c| by_channel.remove(&c))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub frequency: Option<Frequency>,
    pub first_index: u32,
    pub last_index: u32,
    pub frame_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_converts_between_units() {
        let l = Length::from_feet(10.0);
        assert!((l.meters() - 3.048).abs() < 1e-12);
        assert!((l.to(LengthUnit::Inch) - 120.0).abs() < 1e-9);
        assert!((Length::new(1.0, LengthUnit::Kilometer).meters() - 1000.0).abs() < 1e-12);
    }

    #[test]
    fn point_key_ignores_zero_sign() {
        let a = CoordinatePoint::new(0.0, -0.0);
        let b = CoordinatePoint::new(-0.0, 0.0);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn haversine_one_degree_latitude() {
        let a = CoordinatePoint::new(0.0, 0.0);
        let b = CoordinatePoint::new(1.0, 0.0);
        let d = a.distance_to(&b);
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn channel_ids_round_trip_through_u16() {
        for id in [0u16, 1, 2, 3, 4, 5, 9, 7] {
            assert_eq!(Channel::from(id).id(), id);
        }
        assert_eq!(Channel::from(7), Channel::Other(7));
    }
}
